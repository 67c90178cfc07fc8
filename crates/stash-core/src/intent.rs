//! Intents raised by the MyStuff view.
//!
//! The view never mutates items. Every user action becomes a
//! [`MyStuffIntent`] handed to the owner, which decides what happens.

use std::path::PathBuf;

use crate::item::Item;

/// A request from the view to its owner.
#[derive(Debug, Clone, PartialEq)]
pub enum MyStuffIntent {
    /// An item row was clicked.
    Select { folder: String, item: Item },
    /// "New" was clicked in a folder.
    Add { folder: String },
    Delete { folder: String, item: Item },
    Duplicate { folder: String, item: Item },
    /// Restore the last deleted item. No control in the view raises this.
    Undo { folder: String, item: Option<Item> },
    /// Files were picked for import; `None` when the picker returned nothing.
    Import {
        folder: String,
        files: Option<Vec<PathBuf>>,
    },
    Export { folder: String, item: Item },
}

impl MyStuffIntent {
    /// Folder the intent applies to.
    pub fn folder(&self) -> &str {
        match self {
            MyStuffIntent::Select { folder, .. }
            | MyStuffIntent::Add { folder }
            | MyStuffIntent::Delete { folder, .. }
            | MyStuffIntent::Duplicate { folder, .. }
            | MyStuffIntent::Undo { folder, .. }
            | MyStuffIntent::Import { folder, .. }
            | MyStuffIntent::Export { folder, .. } => folder,
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            MyStuffIntent::Select { .. } => "select",
            MyStuffIntent::Add { .. } => "add",
            MyStuffIntent::Delete { .. } => "delete",
            MyStuffIntent::Duplicate { .. } => "duplicate",
            MyStuffIntent::Undo { .. } => "undo",
            MyStuffIntent::Import { .. } => "import",
            MyStuffIntent::Export { .. } => "export",
        }
    }
}

/// Callback contract between the view and its owner.
#[cfg_attr(test, mockall::automock)]
pub trait MyStuffHandler {
    fn on_select(&mut self, folder: &str, item: &Item);
    fn on_add(&mut self, folder: &str);
    fn on_delete(&mut self, folder: &str, item: &Item);
    fn on_duplicate(&mut self, folder: &str, item: &Item);
    fn on_undo(&mut self, folder: &str, item: Option<Item>);
    fn on_import(&mut self, folder: &str, files: Option<Vec<PathBuf>>);
    fn on_export(&mut self, folder: &str, item: &Item);
}

/// Route an intent to the matching handler callback.
pub fn dispatch<H: MyStuffHandler + ?Sized>(handler: &mut H, intent: MyStuffIntent) {
    match intent {
        MyStuffIntent::Select { folder, item } => handler.on_select(&folder, &item),
        MyStuffIntent::Add { folder } => handler.on_add(&folder),
        MyStuffIntent::Delete { folder, item } => handler.on_delete(&folder, &item),
        MyStuffIntent::Duplicate { folder, item } => handler.on_duplicate(&folder, &item),
        MyStuffIntent::Undo { folder, item } => handler.on_undo(&folder, item),
        MyStuffIntent::Import { folder, files } => handler.on_import(&folder, files),
        MyStuffIntent::Export { folder, item } => handler.on_export(&folder, &item),
    }
}

/// The folder's import control.
///
/// Holds the last picked selection only until it is forwarded, so picking
/// the same files again produces a fresh intent.
#[derive(Debug, Default)]
pub struct ImportInput {
    value: Option<Vec<PathBuf>>,
}

impl ImportInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current selection; empty right after every change.
    pub fn value(&self) -> Option<&[PathBuf]> {
        self.value.as_deref()
    }

    /// Record a picker result, forward it, then clear the control.
    pub fn change(&mut self, folder: &str, files: Option<Vec<PathBuf>>) -> MyStuffIntent {
        self.value = files;
        let intent = MyStuffIntent::Import {
            folder: folder.to_string(),
            files: self.value.take(),
        };
        tracing::debug!("import input changed for '{}'", folder);
        intent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_routes_each_intent() {
        let item = Item::new("1", "Foo", "x", 1);
        let mut handler = MockMyStuffHandler::new();
        handler
            .expect_on_select()
            .withf(|folder, item| folder == "A" && item.id == "1")
            .times(1)
            .return_const(());
        handler
            .expect_on_add()
            .withf(|folder| folder == "A")
            .times(1)
            .return_const(());
        handler.expect_on_export().times(1).return_const(());
        handler.expect_on_undo().times(1).return_const(());

        dispatch(
            &mut handler,
            MyStuffIntent::Select {
                folder: "A".into(),
                item: item.clone(),
            },
        );
        dispatch(&mut handler, MyStuffIntent::Add { folder: "A".into() });
        dispatch(
            &mut handler,
            MyStuffIntent::Export {
                folder: "A".into(),
                item,
            },
        );
        dispatch(
            &mut handler,
            MyStuffIntent::Undo {
                folder: "A".into(),
                item: None,
            },
        );
    }

    #[test]
    fn test_import_fires_once_per_selection_and_clears() {
        let files = vec![PathBuf::from("/tmp/a.json")];
        let mut input = ImportInput::new();
        let mut handler = MockMyStuffHandler::new();
        handler
            .expect_on_import()
            .withf({
                let files = files.clone();
                move |folder, picked| folder == "A" && picked.as_ref() == Some(&files)
            })
            .times(2)
            .return_const(());

        let intent = input.change("A", Some(files.clone()));
        assert!(input.value().is_none());
        dispatch(&mut handler, intent);

        // Same file again still produces an intent.
        let intent = input.change("A", Some(files.clone()));
        assert!(input.value().is_none());
        dispatch(&mut handler, intent);
    }

    #[test]
    fn test_import_forwards_empty_selection() {
        let mut input = ImportInput::new();
        let intent = input.change("A", None);
        assert_eq!(
            intent,
            MyStuffIntent::Import {
                folder: "A".into(),
                files: None
            }
        );
    }

    #[test]
    fn test_intent_folder_and_name() {
        let intent = MyStuffIntent::Add { folder: "B".into() };
        assert_eq!(intent.folder(), "B");
        assert_eq!(intent.name(), "add");
    }
}
