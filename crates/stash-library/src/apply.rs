//! Turning view intents into library side effects.

use std::fmt;
use std::path::PathBuf;

use stash_core::{dispatch, Item, MyStuffHandler, MyStuffIntent};

use crate::error::LibraryError;
use crate::library::{ImportReport, Library, Selection};

/// What an applied intent did.
#[derive(Debug)]
pub enum Outcome {
    Selected(Selection),
    Added(Item),
    Deleted(Item),
    Duplicated(Item),
    Restored { folder: String, item: Item },
    Imported(ImportReport),
    Exported(PathBuf),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Selected(selection) => write!(f, "Selected {}", selection.name),
            Outcome::Added(item) => write!(f, "Added {}", item.name),
            Outcome::Deleted(item) => write!(f, "Deleted {}", item.name),
            Outcome::Duplicated(item) => write!(f, "Created {}", item.name),
            Outcome::Restored { folder, item } => write!(f, "Restored {} to {}", item.name, folder),
            Outcome::Imported(report) if report.failures.is_empty() => {
                write!(f, "Imported {} items", report.imported.len())
            }
            Outcome::Imported(report) => write!(
                f,
                "Imported {} items, {} files failed",
                report.imported.len(),
                report.failures.len()
            ),
            Outcome::Exported(path) => write!(f, "Exported to {}", path.display()),
        }
    }
}

/// Handler that forwards each callback to a library and keeps the result.
struct Applier<'a> {
    library: &'a Library,
    result: Option<Result<Outcome, LibraryError>>,
}

impl MyStuffHandler for Applier<'_> {
    fn on_select(&mut self, folder: &str, item: &Item) {
        self.result = Some(self.library.select(folder, item).map(Outcome::Selected));
    }

    fn on_add(&mut self, folder: &str) {
        self.result = Some(self.library.add(folder).map(Outcome::Added));
    }

    fn on_delete(&mut self, folder: &str, item: &Item) {
        self.result = Some(self.library.delete(folder, &item.id).map(Outcome::Deleted));
    }

    fn on_duplicate(&mut self, folder: &str, item: &Item) {
        self.result = Some(
            self.library
                .duplicate(folder, &item.id)
                .map(Outcome::Duplicated),
        );
    }

    fn on_undo(&mut self, _folder: &str, item: Option<Item>) {
        self.result = Some(
            self.library
                .undo(item.as_ref())
                .map(|(folder, item)| Outcome::Restored { folder, item }),
        );
    }

    fn on_import(&mut self, folder: &str, files: Option<Vec<PathBuf>>) {
        self.result = Some(
            self.library
                .import(folder, files.as_deref())
                .map(Outcome::Imported),
        );
    }

    fn on_export(&mut self, folder: &str, item: &Item) {
        self.result = Some(self.library.export(folder, item).map(Outcome::Exported));
    }
}

impl Library {
    /// Perform the side effect an intent asks for.
    pub fn apply(&self, intent: MyStuffIntent) -> Result<Outcome, LibraryError> {
        let name = intent.name();
        tracing::debug!("Applying {} intent for '{}'", name, intent.folder());
        let mut applier = Applier {
            library: self,
            result: None,
        };
        dispatch(&mut applier, intent);
        applier.result.unwrap_or(Err(LibraryError::Unhandled(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stash_core::Folders;
    use tempfile::TempDir;

    fn library() -> Library {
        let folders: Folders = vec![("A".to_string(), vec![Item::new("1", "Foo", "note", 10)])]
            .into_iter()
            .collect();
        Library::in_memory(folders)
    }

    #[test]
    fn test_apply_add_and_delete_and_undo() {
        let library = library();
        let added = library
            .apply(MyStuffIntent::Add { folder: "A".into() })
            .unwrap();
        assert_eq!(added.to_string(), "Added Untitled");

        let foo = Item::new("1", "Foo", "note", 10);
        let deleted = library
            .apply(MyStuffIntent::Delete {
                folder: "A".into(),
                item: foo,
            })
            .unwrap();
        assert!(matches!(deleted, Outcome::Deleted(ref item) if item.id == "1"));

        let restored = library
            .apply(MyStuffIntent::Undo {
                folder: "A".into(),
                item: None,
            })
            .unwrap();
        assert_eq!(restored.to_string(), "Restored Foo to A");
        assert_eq!(library.folders().items("A")[0].id, "1");
    }

    #[test]
    fn test_apply_select_and_duplicate() {
        let library = library();
        let foo = Item::new("1", "Foo", "note", 10);
        let selected = library
            .apply(MyStuffIntent::Select {
                folder: "A".into(),
                item: foo.clone(),
            })
            .unwrap();
        assert_eq!(selected.to_string(), "Selected Foo");

        let copy = library
            .apply(MyStuffIntent::Duplicate {
                folder: "A".into(),
                item: foo,
            })
            .unwrap();
        assert_eq!(copy.to_string(), "Created Foo (copy)");
    }

    #[test]
    fn test_apply_import_and_export() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("in.json");
        std::fs::write(&file, r#"{"name": "Imported"}"#).unwrap();

        let library = library().with_export_dir(dir.path().join("out"));
        let imported = library
            .apply(MyStuffIntent::Import {
                folder: "A".into(),
                files: Some(vec![file]),
            })
            .unwrap();
        assert_eq!(imported.to_string(), "Imported 1 items");

        let exported = library
            .apply(MyStuffIntent::Export {
                folder: "A".into(),
                item: Item::new("1", "Foo", "note", 10),
            })
            .unwrap();
        assert!(matches!(exported, Outcome::Exported(ref p) if p.ends_with("Foo.json")));
    }

    #[test]
    fn test_apply_reports_errors() {
        let err = library()
            .apply(MyStuffIntent::Add { folder: "Z".into() })
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown folder: Z");
    }
}
