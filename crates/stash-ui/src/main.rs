//! Stash - main entry point.
//!
//! Loads the configuration, opens the item library, and starts the GPUI
//! application.

use std::sync::Arc;

use clap::Parser;

use stash_core::AppConfig;
use stash_library::Library;
use stash_ui::backend::LibraryBackend;
use stash_ui::cli::{dump, CliArgs};
use stash_ui::window::run_app;

// =============================================================================
// Configuration
// =============================================================================

/// Load the configuration, falling back to defaults when it is unreadable.
fn load_config(args: &CliArgs) -> AppConfig {
    match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{} - continuing with defaults", e);
            AppConfig::default()
        }
    }
}

/// Open the library named by the config.
///
/// An unreadable library file is reported and replaced by an in-memory
/// library so the window still opens.
fn open_library(config: &AppConfig) -> Library {
    match Library::from_config(&config.library) {
        Ok(library) => {
            if let Some(path) = library.path() {
                tracing::info!("Library opened at: {}", path.display());
            }
            library
        }
        Err(e) => {
            tracing::error!("Failed to open library: {} - changes will not be saved", e);
            let seed = config
                .library
                .folders
                .iter()
                .map(|name| (name.clone(), Vec::new()))
                .collect();
            let library = Library::in_memory(seed);
            match config.library.export_dir() {
                Some(dir) => library.with_export_dir(dir),
                None => library,
            }
        }
    }
}

// =============================================================================
// Entry Point
// =============================================================================

fn main() {
    let args = CliArgs::parse();

    // Initialize logging; stderr keeps `--dump` output clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Stash starting...");

    // Keep a tokio context entered for the lifetime of the app; the library
    // broadcasts over tokio watch channels.
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let _guard = rt.enter();

    let config = load_config(&args);
    let library = Arc::new(open_library(&config));

    if args.dump {
        print!(
            "{}",
            dump(library.folders(), &args.navigation(), config.view_options())
        );
        return;
    }

    let backend = Arc::new(LibraryBackend::new(library));

    tracing::info!("Starting GPUI application...");
    run_app(config, args.navigation(), backend);
}
