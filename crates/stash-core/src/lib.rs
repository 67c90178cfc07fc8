//! Core types for the Stash item browser.
//!
//! This crate contains everything below the UI toolkit:
//! - Item and folder types
//! - The MyStuff view state, view selection and render model
//! - Grouping, recency and search over items
//! - Debounced values, stable multi-key sorting, avatar derivation
//! - Intents raised by the view
//! - Configuration and error types

mod avatar;
mod config;
mod debounce;
mod element;
mod error;
mod intent;
mod item;
mod listing;
mod sort;
mod view;

pub use avatar::{abbreviation, color, contrast_text, Avatar, Rgb};
pub use config::{
    config_dir, config_path, data_dir, AppConfig, AppearanceConfig, BehaviorConfig,
    LibraryConfig, ThemeMode,
};
pub use debounce::{Debounced, DEFAULT_DELAY};
pub use element::{ElementRow, ElementState, RowAction, RowTarget};
pub use error::ConfigError;
pub use intent::{dispatch, ImportInput, MyStuffHandler, MyStuffIntent};
pub use item::{Folders, Item};
pub use listing::{
    group_items, latest, matches_search, search, sort_by_latest, AsItem, FolderItem, ItemGroup,
    LATEST_COUNT,
};
pub use sort::{sort_by_keys, Direction, SortKey, SortValue};
pub use view::{
    render, where_for, Body, Leading, Listing, MyStuffProps, MyStuffState, MyStuffView,
    SearchBar, Section, ViewOptions, Where, EMPTY_PLACEHOLDER, SEARCH_PLACEHOLDER,
};
