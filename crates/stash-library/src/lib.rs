//! Item storage for Stash.
//!
//! The [`Library`] owns the canonical folders and performs the side effects
//! the MyStuff view asks for:
//! - add, duplicate, delete and undo
//! - JSON import and export
//! - selection tracking
//!
//! Every change is persisted to the library file and broadcast through a
//! `tokio::sync::watch` channel.

mod apply;
mod error;
mod library;
mod transfer;

pub use apply::Outcome;
pub use error::LibraryError;
pub use library::{
    now_millis, ImportReport, Library, LibrarySnapshot, Selection, NEW_ITEM_NAME, UNDO_LIMIT,
};
pub use transfer::{export_file_name, ItemDraft, DEFAULT_KIND};
