//! Observable item library.
//!
//! Same contract as an observable store: every method that changes the
//! library also broadcasts the new snapshot and persists the folders.
//! Callers cannot mutate without notifying.

use parking_lot::RwLock;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::watch;

use stash_core::{Folders, Item, LibraryConfig};

use crate::error::LibraryError;
use crate::transfer::{self, DEFAULT_KIND};

/// Deleted items kept for undo.
pub const UNDO_LIMIT: usize = 50;

/// Name given to new items.
pub const NEW_ITEM_NAME: &str = "Untitled";

// =============================================================================
// Snapshot Types
// =============================================================================

/// The item last selected in the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub folder: String,
    pub item_id: String,
    pub name: String,
}

/// State broadcast to subscribers after every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibrarySnapshot {
    pub folders: Folders,
    pub selection: Option<Selection>,
    /// Deletions that can still be undone.
    pub undo_depth: usize,
}

/// A deletion remembered for undo.
#[derive(Debug, Clone, PartialEq)]
struct Deleted {
    folder: String,
    index: usize,
    item: Item,
}

/// Result of importing a set of files.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: Vec<Item>,
    /// Files that could not be read; the others were still applied.
    pub failures: Vec<(PathBuf, LibraryError)>,
}

#[derive(Debug, Default)]
struct Inner {
    folders: Folders,
    undo: VecDeque<Deleted>,
    selection: Option<Selection>,
}

impl Inner {
    fn snapshot(&self) -> LibrarySnapshot {
        LibrarySnapshot {
            folders: self.folders.clone(),
            selection: self.selection.clone(),
            undo_depth: self.undo.len(),
        }
    }

    fn folder_mut(&mut self, folder: &str) -> Result<&mut Vec<Item>, LibraryError> {
        self.folders
            .get_mut(folder)
            .ok_or_else(|| LibraryError::UnknownFolder(folder.to_string()))
    }

    fn position(&self, folder: &str, id: &str) -> Result<usize, LibraryError> {
        let items = self
            .folders
            .get(folder)
            .ok_or_else(|| LibraryError::UnknownFolder(folder.to_string()))?;
        items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| LibraryError::UnknownItem {
                folder: folder.to_string(),
                id: id.to_string(),
            })
    }
}

// =============================================================================
// Library
// =============================================================================

/// Canonical folder store.
///
/// ## Thread Safety
///
/// Uses `parking_lot::RwLock` for the state and `tokio::sync::watch` for
/// broadcasts. Reads are concurrent; writes are exclusive.
pub struct Library {
    inner: RwLock<Inner>,
    tx: watch::Sender<LibrarySnapshot>,
    rx: watch::Receiver<LibrarySnapshot>,
    path: Option<PathBuf>,
    export_dir: Option<PathBuf>,
}

impl Library {
    /// Create a library that lives only in memory.
    pub fn in_memory(folders: Folders) -> Self {
        let inner = Inner {
            folders,
            ..Default::default()
        };
        let (tx, rx) = watch::channel(inner.snapshot());
        Self {
            inner: RwLock::new(inner),
            tx,
            rx,
            path: None,
            export_dir: None,
        }
    }

    /// Open the library file, seeding `seed` folders when it does not exist.
    pub fn open(path: impl Into<PathBuf>, seed: &[String]) -> Result<Self, LibraryError> {
        let path = path.into();
        let (folders, fresh) = match transfer::load_folders(&path)? {
            Some(folders) => {
                tracing::info!(
                    "Loaded library from {} ({} folders, {} items)",
                    path.display(),
                    folders.len(),
                    folders.item_count()
                );
                (folders, false)
            }
            None => {
                tracing::info!("No library at {} - seeding", path.display());
                let folders = seed.iter().map(|name| (name.clone(), Vec::new())).collect();
                (folders, true)
            }
        };

        let mut library = Self::in_memory(folders);
        library.path = Some(path);
        if fresh {
            library.persist(&library.inner.read().folders);
        }
        Ok(library)
    }

    /// Open the library described by the config.
    ///
    /// Falls back to an in-memory library when no data directory exists.
    pub fn from_config(config: &LibraryConfig) -> Result<Self, LibraryError> {
        let library = match config.library_path() {
            Some(path) => Self::open(path, &config.folders)?,
            None => {
                tracing::warn!("No data directory - library will not be saved");
                Self::in_memory(
                    config
                        .folders
                        .iter()
                        .map(|name| (name.clone(), Vec::new()))
                        .collect(),
                )
            }
        };
        Ok(match config.export_dir() {
            Some(dir) => library.with_export_dir(dir),
            None => library,
        })
    }

    /// Set where exports are written.
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = Some(dir.into());
        self
    }

    /// Library file, if persisted.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn export_dir(&self) -> Option<&Path> {
        self.export_dir.as_deref()
    }

    /// Subscribe to snapshots. Clone the receiver for each subscriber.
    pub fn subscribe(&self) -> watch::Receiver<LibrarySnapshot> {
        self.rx.clone()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> LibrarySnapshot {
        self.inner.read().snapshot()
    }

    pub fn folders(&self) -> Folders {
        self.inner.read().folders.clone()
    }

    /// Deletions that can still be undone.
    pub fn undo_depth(&self) -> usize {
        self.inner.read().undo.len()
    }

    // =========================================================================
    // Mutation Methods (all broadcast automatically)
    // =========================================================================

    /// Run a mutation; on success broadcast, and persist when folders changed.
    ///
    /// The broadcast happens under the write lock so snapshots go out in
    /// mutation order.
    fn mutate<R>(
        &self,
        persist: bool,
        f: impl FnOnce(&mut Inner) -> Result<R, LibraryError>,
    ) -> Result<R, LibraryError> {
        let mut inner = self.inner.write();
        let result = f(&mut inner)?;
        if persist {
            self.persist(&inner.folders);
        }
        let _ = self.tx.send(inner.snapshot());
        Ok(result)
    }

    fn persist(&self, folders: &Folders) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = transfer::save_folders(path, folders) {
            tracing::error!("Failed to save library: {}", e);
        }
    }

    /// Append a new item with a unique "Untitled" name.
    pub fn add(&self, folder: &str) -> Result<Item, LibraryError> {
        self.mutate(true, |inner| {
            let items = inner.folder_mut(folder)?;
            let name = unique_name(items, NEW_ITEM_NAME);
            let item = Item::new(new_id(), name, DEFAULT_KIND, now_millis());
            items.push(item.clone());
            tracing::debug!("Added '{}' to '{}'", item.name, folder);
            Ok(item)
        })
    }

    /// Insert a copy right after the original.
    pub fn duplicate(&self, folder: &str, id: &str) -> Result<Item, LibraryError> {
        self.mutate(true, |inner| {
            let index = inner.position(folder, id)?;
            let items = inner.folder_mut(folder)?;
            let original = &items[index];
            let mut copy = original.clone();
            copy.id = new_id();
            copy.name = unique_name(items, &format!("{} (copy)", original.name));
            copy.last_updated = now_millis();
            items.insert(index + 1, copy.clone());
            tracing::debug!("Duplicated '{}' in '{}'", copy.name, folder);
            Ok(copy)
        })
    }

    /// Remove an item and remember it for undo.
    pub fn delete(&self, folder: &str, id: &str) -> Result<Item, LibraryError> {
        self.mutate(true, |inner| {
            let index = inner.position(folder, id)?;
            let item = inner.folder_mut(folder)?.remove(index);
            inner.undo.push_back(Deleted {
                folder: folder.to_string(),
                index,
                item: item.clone(),
            });
            if inner.undo.len() > UNDO_LIMIT {
                inner.undo.pop_front();
            }
            if inner
                .selection
                .as_ref()
                .is_some_and(|s| s.item_id == item.id)
            {
                inner.selection = None;
            }
            tracing::debug!("Deleted '{}' from '{}'", item.name, folder);
            Ok(item)
        })
    }

    /// Restore a deleted item at its original position.
    ///
    /// With `item` set, restores that item's latest deletion; otherwise the
    /// most recent deletion overall. Returns the folder and the item.
    pub fn undo(&self, item: Option<&Item>) -> Result<(String, Item), LibraryError> {
        self.mutate(true, |inner| {
            let slot = match item {
                Some(wanted) => inner.undo.iter().rposition(|d| d.item.id == wanted.id),
                None => inner.undo.len().checked_sub(1),
            };
            let deleted = slot
                .and_then(|i| inner.undo.remove(i))
                .ok_or(LibraryError::NothingToUndo)?;

            let items = inner.folders.ensure(&deleted.folder);
            let index = deleted.index.min(items.len());
            items.insert(index, deleted.item.clone());
            tracing::debug!("Restored '{}' to '{}'", deleted.item.name, deleted.folder);
            Ok((deleted.folder, deleted.item))
        })
    }

    /// Import items from JSON files into a folder.
    ///
    /// A file that fails to parse is reported and skipped.
    pub fn import(
        &self,
        folder: &str,
        files: Option<&[PathBuf]>,
    ) -> Result<ImportReport, LibraryError> {
        let files = files.unwrap_or_default();
        if !self.inner.read().folders.contains(folder) {
            return Err(LibraryError::UnknownFolder(folder.to_string()));
        }

        let mut report = ImportReport::default();
        for path in files {
            match transfer::read_drafts(path) {
                Ok(drafts) => {
                    let now = now_millis();
                    report
                        .imported
                        .extend(drafts.into_iter().map(|d| d.into_item(new_id(), now)));
                }
                Err(e) => {
                    tracing::warn!("Import of {} failed: {}", path.display(), e);
                    report.failures.push((path.clone(), e));
                }
            }
        }

        if report.imported.is_empty() {
            return Ok(report);
        }
        let imported = report.imported.clone();
        self.mutate(true, move |inner| {
            let count = imported.len();
            inner.folder_mut(folder)?.extend(imported);
            tracing::info!("Imported {} items into '{}'", count, folder);
            Ok(())
        })?;
        Ok(report)
    }

    /// Write an item to the export directory. Returns the written path.
    pub fn export(&self, folder: &str, item: &Item) -> Result<PathBuf, LibraryError> {
        let dir = self.export_dir.as_deref().ok_or(LibraryError::NoExportDir)?;
        let path = transfer::write_export(dir, item)?;
        tracing::info!("Exported '{}' from '{}' to {}", item.name, folder, path.display());
        Ok(path)
    }

    /// Record the selected item.
    pub fn select(&self, folder: &str, item: &Item) -> Result<Selection, LibraryError> {
        self.mutate(false, |inner| {
            inner.position(folder, &item.id)?;
            let selection = Selection {
                folder: folder.to_string(),
                item_id: item.id.clone(),
                name: item.name.clone(),
            };
            inner.selection = Some(selection.clone());
            tracing::info!("Selected '{}' in '{}'", item.name, folder);
            Ok(selection)
        })
    }
}

/// `base`, or `base 2`, `base 3`... whichever is free in `items`.
fn unique_name(items: &[Item], base: &str) -> String {
    let taken = |name: &str| items.iter().any(|item| item.name == name);
    if !taken(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base} {n}"))
        .find(|name| !taken(name))
        .unwrap_or_else(|| base.to_string())
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn library() -> Library {
        let folders: Folders = vec![
            (
                "A".to_string(),
                vec![
                    Item::new("1", "Foo", "note", 10),
                    Item::new("2", "Bar", "note", 20),
                ],
            ),
            ("B".to_string(), vec![]),
        ]
        .into_iter()
        .collect();
        Library::in_memory(folders)
    }

    fn names(library: &Library, folder: &str) -> Vec<String> {
        library
            .folders()
            .items(folder)
            .iter()
            .map(|i| i.name.clone())
            .collect()
    }

    #[test]
    fn test_add_numbers_untitled() {
        let library = library();
        let first = library.add("B").unwrap();
        let second = library.add("B").unwrap();
        assert_eq!(first.name, "Untitled");
        assert_eq!(second.name, "Untitled 2");
        assert_eq!(first.kind, DEFAULT_KIND);
        assert_ne!(first.id, second.id);
        assert!(first.last_updated > 0);
    }

    #[test]
    fn test_add_unknown_folder() {
        let err = library().add("Z").unwrap_err();
        assert!(matches!(err, LibraryError::UnknownFolder(f) if f == "Z"));
    }

    #[test]
    fn test_duplicate_inserts_after_original() {
        let library = library();
        let copy = library.duplicate("A", "1").unwrap();
        assert_eq!(copy.name, "Foo (copy)");
        assert_ne!(copy.id, "1");
        assert_eq!(names(&library, "A"), vec!["Foo", "Foo (copy)", "Bar"]);

        let again = library.duplicate("A", "1").unwrap();
        assert_eq!(again.name, "Foo (copy) 2");
    }

    #[test]
    fn test_delete_then_undo_restores_position() {
        let library = library();
        library.delete("A", "1").unwrap();
        assert_eq!(names(&library, "A"), vec!["Bar"]);
        assert_eq!(library.undo_depth(), 1);

        let (folder, item) = library.undo(None).unwrap();
        assert_eq!(folder, "A");
        assert_eq!(item.id, "1");
        assert_eq!(names(&library, "A"), vec!["Foo", "Bar"]);
        assert!(matches!(library.undo(None), Err(LibraryError::NothingToUndo)));
    }

    #[test]
    fn test_undo_specific_item() {
        let library = library();
        let foo = library.delete("A", "1").unwrap();
        library.delete("A", "2").unwrap();

        let (_, restored) = library.undo(Some(&foo)).unwrap();
        assert_eq!(restored.id, "1");
        assert_eq!(names(&library, "A"), vec!["Foo"]);
        assert_eq!(library.undo_depth(), 1);
    }

    #[test]
    fn test_undo_stack_is_bounded() {
        let library = library();
        for _ in 0..(UNDO_LIMIT + 5) {
            let item = library.add("B").unwrap();
            library.delete("B", &item.id).unwrap();
        }
        assert_eq!(library.undo_depth(), UNDO_LIMIT);
    }

    #[test]
    fn test_delete_unknown_item() {
        let err = library().delete("A", "nope").unwrap_err();
        assert!(matches!(err, LibraryError::UnknownItem { .. }));
    }

    #[test]
    fn test_select_records_selection() {
        let library = library();
        let item = Item::new("2", "Bar", "note", 20);
        library.select("A", &item).unwrap();
        let selection = library.snapshot().selection.unwrap();
        assert_eq!(selection.item_id, "2");
        assert_eq!(selection.folder, "A");

        library.delete("A", "2").unwrap();
        assert!(library.snapshot().selection.is_none());
    }

    #[test]
    fn test_import_applies_good_files_and_reports_bad() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.json");
        std::fs::write(&good, r#"[{"name": "X"}, {"name": "Y", "type": "map"}]"#).unwrap();
        std::fs::write(&bad, "oops").unwrap();

        let library = library();
        let files = vec![good, bad.clone()];
        let report = library.import("B", Some(&files)).unwrap();
        assert_eq!(report.imported.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, bad);
        assert_eq!(names(&library, "B"), vec!["X", "Y"]);
    }

    #[test]
    fn test_import_without_files_is_noop() {
        let library = library();
        let report = library.import("B", None).unwrap();
        assert!(report.imported.is_empty());
        assert!(library.folders().items("B").is_empty());
    }

    #[test]
    fn test_export_requires_dir() {
        let item = Item::new("1", "Foo", "note", 10);
        assert!(matches!(
            library().export("A", &item),
            Err(LibraryError::NoExportDir)
        ));

        let dir = TempDir::new().unwrap();
        let library = library().with_export_dir(dir.path());
        let path = library.export("A", &item).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_open_seeds_and_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("library.json");
        let seed = vec!["Notes".to_string(), "Maps".to_string()];

        let library = Library::open(&path, &seed).unwrap();
        assert!(path.exists());
        let added = library.add("Maps").unwrap();
        drop(library);

        let reopened = Library::open(&path, &[]).unwrap();
        let folders = reopened.folders();
        assert_eq!(folders.names().collect::<Vec<_>>(), vec!["Notes", "Maps"]);
        assert_eq!(folders.items("Maps"), &[added]);
    }

    #[test]
    fn test_open_rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            Library::open(&path, &[]),
            Err(LibraryError::Json { .. })
        ));
    }

    #[tokio::test]
    async fn test_mutations_broadcast() {
        let library = library();
        let mut rx = library.subscribe();
        assert_eq!(rx.borrow().folders.item_count(), 2);

        library.add("A").unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().folders.item_count(), 3);

        library.delete("A", "1").unwrap();
        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.folders.item_count(), 2);
        assert_eq!(snapshot.undo_depth, 1);
    }

    #[tokio::test]
    async fn test_failed_mutation_does_not_broadcast() {
        let library = library();
        let mut rx = library.subscribe();
        rx.borrow_and_update();
        assert!(library.add("Z").is_err());
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_concurrent_mutations_broadcast_latest_state() {
        let library = library();
        let rx = library.subscribe();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..25 {
                        library.add("B").unwrap();
                    }
                });
            }
        });

        assert_eq!(library.folders().items("B").len(), 100);
        assert_eq!(*rx.borrow(), library.snapshot());
    }

    #[test]
    fn test_unique_name() {
        let items = vec![
            Item::new("1", "Untitled", "x", 1),
            Item::new("2", "Untitled 2", "x", 1),
        ];
        assert_eq!(unique_name(&items, "Untitled"), "Untitled 3");
        assert_eq!(unique_name(&items, "Other"), "Other");
    }
}
