//! locale-sync
//!
//! Synchronizes translation exports of a crowd-translation platform into
//! hierarchical YAML locale files, correcting known export defects on merge.

pub mod cli;
pub mod codec;
pub mod config;
pub mod input;
pub mod rules;
pub mod sync;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use rules::MergeRules;
pub use sync::{
    SyncError,
    SyncMode,
    Synchronizer,
};
