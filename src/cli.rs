//! Command-line argument definition.

use std::path::PathBuf;

use clap::Parser;

use crate::sync::SyncMode;

/// Synchronize crowd-sourced translations into local locale files
#[derive(Parser, Debug)]
#[command(name = "locale-sync")]
#[command(version)]
#[command(about = "Synchronize crowd-sourced translations into local locale files", long_about = None)]
pub struct Args {
    /// Directory holding the locale files
    #[arg(short, long, default_value = "locales")]
    pub dir: PathBuf,

    /// Only import languages that have no locale file yet
    #[arg(short = 'n', long)]
    pub only_new: bool,

    /// Reuse fetched upstream data across runs
    #[arg(short, long)]
    pub cache: bool,

    /// Configuration file (default: ./.locale-sync.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output (equivalent to RUST_LOG=debug)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    #[must_use]
    pub const fn mode(&self) -> SyncMode {
        if self.only_new { SyncMode::OnlyNew } else { SyncMode::Full }
    }
}
