//! GPUI frontend for Stash.
//!
//! This crate provides the native GPUI user interface including:
//! - StashWindow for window management
//! - MyStuffPanel for browsing and managing items
//! - Backend integration with the item library
//! - Keybindings and theme
//! - Command-line arguments

pub mod actions;
pub mod backend;
pub mod cli;
pub mod keymap;
pub mod model;
pub mod theme;
pub mod views;
pub mod window;

// Re-export commonly used types
pub use backend::{Backend, BackendState, LibraryBackend};
pub use model::{flatten, ListEntry, StatusMessage};
pub use theme::{Appearance, Theme, ThemeExt, ThemeSettings};
pub use views::{MyStuffPanel, MyStuffPanelEvent, SearchInput, SearchInputEvent};
pub use cli::CliArgs;
pub use window::{run_app, HostNavigation, StashWindow};
