//! Entry point for the locale synchronization tool.

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{
    CommandFactory,
    Parser,
};
use locale_sync::Synchronizer;
use locale_sync::cli::Args;
use locale_sync::config::load_settings;
use locale_sync::input::provider::HttpProvider;
use locale_sync::input::store::FsLocaleStore;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    if !args.dir.is_dir() {
        Args::command()
            .error(
                ErrorKind::ValueValidation,
                format!("locale directory {} does not exist", args.dir.display()),
            )
            .exit();
    }

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            let mut source = e.source();
            while let Some(cause) = source {
                tracing::error!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let workspace_root = std::env::current_dir()?;
    let settings = load_settings(args.config.as_deref(), &workspace_root)?;

    let provider = HttpProvider::new(&settings)?;
    let store = FsLocaleStore::new(&args.dir, &settings.file_extension)?;
    let cache_path = args.cache.then(|| settings.cache_path());

    let report = Synchronizer::new(provider, store, &settings)
        .with_mode(args.mode())
        .with_cache(cache_path)
        .run()
        .await?;

    for path in &report.written {
        tracing::info!("Wrote {}", path.display());
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
