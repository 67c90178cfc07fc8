//! Flattening the render model into virtual list rows.

use stash_core::{Body, ElementRow, Listing, MyStuffView, Section};

// =============================================================================
// List Entry
// =============================================================================

/// One row of the virtual list.
#[derive(Debug, Clone, PartialEq)]
pub enum ListEntry {
    /// A folder in the folder list.
    Folder { name: String },
    /// Folder title with the New and Import buttons.
    FolderHeader { folder: String },
    /// A titled section header.
    SectionHeader { title: String, count: usize },
    /// An item row.
    Row(ElementRow),
    /// The empty placeholder.
    Empty,
}

impl ListEntry {
    /// Key for element ids and hover tracking.
    ///
    /// Rows include their position since an item can be listed twice in a
    /// folder view (under "Latest" and in its group).
    pub fn key(&self, index: usize) -> String {
        match self {
            ListEntry::Folder { name } => format!("folder-{name}"),
            ListEntry::Row(row) => format!("row-{index}-{}-{}", row.folder, row.item.id),
            _ => format!("entry-{index}"),
        }
    }
}

fn push_section(entries: &mut Vec<ListEntry>, section: &Section) {
    entries.push(ListEntry::SectionHeader {
        title: section.title.clone(),
        count: section.count,
    });
    entries.extend(section.rows.iter().cloned().map(ListEntry::Row));
}

fn push_listing(entries: &mut Vec<ListEntry>, listing: &Listing) {
    match listing {
        Listing::Empty => entries.push(ListEntry::Empty),
        Listing::Groups(sections) => {
            for section in sections {
                push_section(entries, section);
            }
        }
    }
}

/// Flatten the body of a view in display order.
pub fn flatten(view: &MyStuffView) -> Vec<ListEntry> {
    let mut entries = Vec::new();
    match &view.body {
        Body::Folders(names) => {
            entries.extend(names.iter().map(|name| ListEntry::Folder { name: name.clone() }));
        }
        Body::Folder {
            folder,
            latest,
            listing,
        } => {
            entries.push(ListEntry::FolderHeader {
                folder: folder.clone(),
            });
            if let Some(latest) = latest {
                push_section(&mut entries, latest);
            }
            push_listing(&mut entries, listing);
        }
        Body::Search { listing } => push_listing(&mut entries, listing),
    }
    entries
}

// =============================================================================
// Status Message
// =============================================================================

/// Feedback shown after the library handled an intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Complete { message: String },
    Failed { error: String },
}

impl StatusMessage {
    pub fn text(&self) -> &str {
        match self {
            StatusMessage::Complete { message } => message,
            StatusMessage::Failed { error } => error,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, StatusMessage::Failed { .. })
    }
}

// =============================================================================
// Tests
// =============================================================================
