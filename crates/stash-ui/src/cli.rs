//! Command-line arguments for the `stash` binary.

use std::path::PathBuf;

use clap::Parser;

use stash_core::{render, AppConfig, ConfigError, Folders, MyStuffState, ViewOptions};

use crate::window::{host_props, HostNavigation};

/// Command-line arguments accepted by the `stash` binary.
#[derive(Parser, Debug)]
#[command(name = "stash", version, about = "Browse and manage your stashed items")]
pub struct CliArgs {
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "STASH_CONFIG",
        help = "Configuration file to load (default: <config dir>/stash/config.toml)"
    )]
    pub config: Option<PathBuf>,
    #[arg(
        short = 'q',
        long,
        value_name = "QUERY",
        help = "Start with a search term (default: empty)"
    )]
    pub search: Option<String>,
    #[arg(
        short,
        long,
        value_name = "NAME",
        help = "Start inside a folder (default: folder list)"
    )]
    pub folder: Option<String>,
    #[arg(long, help = "Print the initial view as text and exit")]
    pub dump: bool,
}

impl CliArgs {
    /// Load the configuration named by `--config`, or the default one.
    pub fn load_config(&self) -> Result<AppConfig, ConfigError> {
        match &self.config {
            Some(path) => AppConfig::load_from(path),
            None => AppConfig::load(),
        }
    }

    /// Navigation the window starts with.
    pub fn navigation(&self) -> HostNavigation {
        HostNavigation {
            search: self.search.clone().unwrap_or_default(),
            folder: self.folder.clone(),
        }
    }
}

/// Render the initial view of `folders` as a text outline.
pub fn dump(folders: Folders, navigation: &HostNavigation, options: ViewOptions) -> String {
    let props = host_props(navigation, folders);
    let state = MyStuffState::new(&props, options);
    render(&props, &state).to_string()
}
