//! UI views for Stash.
//!
//! Views are stateful GPUI components that manage focus and emit events.

mod my_stuff_panel;
mod search_input;

pub use my_stuff_panel::{MyStuffPanel, MyStuffPanelEvent};
pub use search_input::{EditBuffer, SearchInput, SearchInputEvent};
