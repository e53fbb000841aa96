use std::path::PathBuf;

use thiserror::Error;

use crate::codec::TreeError;
use crate::input::cache::CacheError;
use crate::input::provider::ProviderError;
use crate::input::store::StoreError;

/// Errors aborting a synchronization run.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The reference language file is required for merging.
    #[error("Reference language '{0}' has no locale file")]
    MissingReference(String),

    /// The reference language file could not be read.
    #[error("Failed to read reference language file: {0}")]
    Reference(#[source] StoreError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// An upstream export does not have exactly one language root.
    #[error("Malformed upstream data for '{language}': {source}")]
    MalformedUpstream {
        language: String,
        #[source]
        source: TreeError,
    },

    /// An existing locale file exists but cannot be merged.
    #[error("Existing file {} for '{language}' cannot be merged: {reason}", path.display())]
    AmbiguousLocalState { language: String, path: PathBuf, reason: String },
}
