//! Per-language synchronization of upstream exports into local locale files.

mod error;
mod orchestrator;

pub use error::SyncError;
pub use orchestrator::{
    LanguagePlan,
    SyncMode,
    SyncReport,
    Synchronizer,
};
