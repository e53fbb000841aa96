//! On-disk snapshot of fetched upstream translations.
//!
//! The snapshot is plain JSON with an explicit format version so it can be
//! inspected and shared between tool versions.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::types::{
    FlatMap,
    LanguageRecord,
};

/// Current snapshot format version.
pub const CACHE_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to access cache file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse cache file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unsupported cache version {found} (expected {expected})", expected = CACHE_VERSION)]
    Version { found: u32 },
}

/// Upstream data of a single language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedLanguage {
    pub name: String,
    pub keys: FlatMap,
}

/// Upstream translations of every language, keyed by language code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamSnapshot {
    pub version: u32,
    pub languages: BTreeMap<String, CachedLanguage>,
}

impl Default for UpstreamSnapshot {
    fn default() -> Self {
        Self { version: CACHE_VERSION, languages: BTreeMap::new() }
    }
}

impl UpstreamSnapshot {
    pub fn insert(&mut self, record: &LanguageRecord, keys: FlatMap) {
        self.languages.insert(record.code.clone(), CachedLanguage { name: record.name.clone(), keys });
    }

    /// Entries sorted by language code.
    pub fn into_entries(self) -> impl Iterator<Item = (LanguageRecord, FlatMap)> {
        self.languages
            .into_iter()
            .map(|(code, language)| (LanguageRecord::new(code, language.name), language.keys))
    }
}

/// Reads a snapshot. Returns `Ok(None)` if no snapshot exists.
pub fn load(path: &Path) -> Result<Option<UpstreamSnapshot>, CacheError> {
    if !path.exists() {
        tracing::debug!("Cache file not found: {:?}", path);
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let snapshot: UpstreamSnapshot = serde_json::from_str(&content)?;
    if snapshot.version != CACHE_VERSION {
        return Err(CacheError::Version { found: snapshot.version });
    }

    tracing::info!(languages = snapshot.languages.len(), "Using cached upstream data from {:?}", path);
    Ok(Some(snapshot))
}

/// Writes a snapshot, replacing any previous one.
pub fn save(path: &Path, snapshot: &UpstreamSnapshot) -> Result<(), CacheError> {
    let content = serde_json::to_string(snapshot)?;
    std::fs::write(path, content)?;
    tracing::debug!("Cache written to {:?}", path);
    Ok(())
}
