//! State model for the Stash UI.
//!
//! All types are GPUI-independent for testability.

mod entries;

pub use entries::{flatten, ListEntry, StatusMessage};
