//! One item row: avatar, labels and hover-revealed actions.

use crate::avatar::Avatar;
use crate::intent::MyStuffIntent;
use crate::item::Item;

/// Secondary actions shown while a row is hovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowAction {
    Export,
    Duplicate,
    Delete,
}

impl RowAction {
    /// Display order in the action cluster.
    pub const ALL: [RowAction; 3] = [RowAction::Export, RowAction::Duplicate, RowAction::Delete];

    pub fn label(self) -> &'static str {
        match self {
            RowAction::Export => "Export",
            RowAction::Duplicate => "Duplicate",
            RowAction::Delete => "Delete",
        }
    }

    /// Stable id for test selectors and element ids.
    pub fn id(self) -> &'static str {
        match self {
            RowAction::Export => "manager.export",
            RowAction::Duplicate => "manager.duplicate",
            RowAction::Delete => "manager.delete",
        }
    }
}

/// Where a click on a row landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTarget {
    /// The row body.
    Row,
    /// One of the action buttons nested in the row.
    Action(RowAction),
}

/// Render model of one item row.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementRow {
    /// Folder the item lives in; intents carry it.
    pub folder: String,
    pub item: Item,
    pub avatar: Avatar,
    /// Show the type label under the name.
    pub display_type: bool,
}

impl ElementRow {
    pub fn new(folder: impl Into<String>, item: Item, display_type: bool) -> Self {
        let avatar = Avatar::for_name(&item.name);
        Self {
            folder: folder.into(),
            item,
            avatar,
            display_type,
        }
    }

    /// Secondary text, present only when the type label is displayed.
    pub fn secondary(&self) -> Option<&str> {
        self.display_type.then_some(self.item.kind.as_str())
    }

    /// Resolve a click to exactly one intent.
    ///
    /// Action buttons consume the click, so the row's select never fires
    /// for them.
    pub fn click(&self, target: RowTarget) -> MyStuffIntent {
        let folder = self.folder.clone();
        let item = self.item.clone();
        match target {
            RowTarget::Row => MyStuffIntent::Select { folder, item },
            RowTarget::Action(RowAction::Export) => MyStuffIntent::Export { folder, item },
            RowTarget::Action(RowAction::Duplicate) => MyStuffIntent::Duplicate { folder, item },
            RowTarget::Action(RowAction::Delete) => MyStuffIntent::Delete { folder, item },
        }
    }
}

/// Per-row pointer state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElementState {
    pub hover: bool,
}

impl ElementState {
    pub fn pointer_enter(&mut self) {
        self.hover = true;
    }

    pub fn pointer_leave(&mut self) {
        self.hover = false;
    }

    /// Whether the action cluster is visible.
    pub fn actions_visible(&self) -> bool {
        self.hover
    }
}
