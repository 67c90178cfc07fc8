//! Reading and writing item files.
//!
//! Import accepts a JSON object for one item or an array of them. Ids in the
//! file are ignored; the library assigns fresh ones.

use serde::Deserialize;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use stash_core::{Folders, Item};

use crate::error::LibraryError;

/// Type given to items that do not declare one.
pub const DEFAULT_KIND: &str = "item";

/// An item as it appears in an import file.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    #[serde(default, rename = "lastUpdated")]
    pub last_updated: Option<i64>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default = "default_kind", rename = "type")]
    pub kind: String,
}

fn default_kind() -> String {
    DEFAULT_KIND.to_string()
}

impl ItemDraft {
    /// Materialize with a fresh id.
    pub fn into_item(self, id: String, now: i64) -> Item {
        let item = Item::new(id, self.name, self.kind, self.last_updated.unwrap_or(now));
        match self.group {
            Some(group) => item.with_group(group),
            None => item,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ImportFile {
    Many(Vec<ItemDraft>),
    One(ItemDraft),
}

/// Parse one import file.
pub fn read_drafts(path: &Path) -> Result<Vec<ItemDraft>, LibraryError> {
    let source = fs::read_to_string(path).map_err(|source| LibraryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ImportFile = serde_json::from_str(&source).map_err(|source| LibraryError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(match file {
        ImportFile::Many(drafts) => drafts,
        ImportFile::One(draft) => vec![draft],
    })
}

/// File name for an exported item.
///
/// Characters that are unsafe in file names become `_`; an empty result
/// falls back to the item id.
pub fn export_file_name(item: &Item) -> String {
    numbered_file_name(&export_stem(item), 1)
}

fn export_stem(item: &Item) -> String {
    let sanitized: String = item
        .name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = sanitized.trim().trim_matches('.');
    if trimmed.is_empty() {
        item.id.clone()
    } else {
        trimmed.to_string()
    }
}

/// `stem.json` for the first attempt, then `stem (2).json`, `stem (3).json`, ...
fn numbered_file_name(stem: &str, attempt: usize) -> String {
    if attempt <= 1 {
        format!("{stem}.json")
    } else {
        format!("{stem} ({attempt}).json")
    }
}

/// Write an item as pretty JSON into `dir`.
///
/// Never replaces an existing file; a taken name gets a numeric suffix.
pub fn write_export(dir: &Path, item: &Item) -> Result<PathBuf, LibraryError> {
    fs::create_dir_all(dir).map_err(|source| LibraryError::Write {
        path: dir.to_path_buf(),
        source,
    })?;
    let json = serde_json::to_string_pretty(item).map_err(|source| LibraryError::Json {
        path: dir.join(export_file_name(item)),
        source,
    })?;

    let stem = export_stem(item);
    let mut attempt = 1;
    loop {
        let path = dir.join(numbered_file_name(&stem, attempt));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(json.as_bytes())
                    .map_err(|source| LibraryError::Write {
                        path: path.clone(),
                        source,
                    })?;
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(source) => return Err(LibraryError::Write { path, source }),
        }
    }
}

/// Load the library file. `Ok(None)` when it does not exist yet.
pub fn load_folders(path: &Path) -> Result<Option<Folders>, LibraryError> {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(LibraryError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&source)
        .map(Some)
        .map_err(|source| LibraryError::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// Save the library file, creating parent directories.
pub fn save_folders(path: &Path, folders: &Folders) -> Result<(), LibraryError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| LibraryError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let json = serde_json::to_string_pretty(folders).map_err(|source| LibraryError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| LibraryError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_single_and_array() {
        let dir = TempDir::new().unwrap();
        let one = dir.path().join("one.json");
        let many = dir.path().join("many.json");
        fs::write(&one, r#"{"name": "Foo", "type": "note"}"#).unwrap();
        fs::write(
            &many,
            r#"[{"id": "x", "name": "A", "lastUpdated": 5, "group": "g"}, {"name": "B"}]"#,
        )
        .unwrap();

        let drafts = read_drafts(&one).unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].kind, "note");

        let drafts = read_drafts(&many).unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].last_updated, Some(5));
        assert_eq!(drafts[1].kind, DEFAULT_KIND);

        let item = drafts[0].clone().into_item("new".into(), 99);
        assert_eq!(item.id, "new");
        assert_eq!(item.last_updated, 5);
        assert_eq!(item.group.as_deref(), Some("g"));
    }

    #[test]
    fn test_read_rejects_bad_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(read_drafts(&path), Err(LibraryError::Json { .. })));
        assert!(matches!(
            read_drafts(&dir.path().join("missing.json")),
            Err(LibraryError::Read { .. })
        ));
    }

    #[test]
    fn test_export_file_name() {
        let item = Item::new("id-1", "Trip: Paris/Rome", "note", 1);
        assert_eq!(export_file_name(&item), "Trip_ Paris_Rome.json");

        let blank = Item::new("id-2", "  ", "note", 1);
        assert_eq!(export_file_name(&blank), "id-2.json");
    }

    #[test]
    fn test_write_export_round_trips_item() {
        let dir = TempDir::new().unwrap();
        let item = Item::new("1", "Foo", "note", 7).with_group("g1");
        let path = write_export(dir.path(), &item).unwrap();
        assert_eq!(path, dir.path().join("Foo.json"));

        let written: Item = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, item);
    }

    #[test]
    fn test_write_export_keeps_existing_files() {
        let dir = TempDir::new().unwrap();
        let first = Item::new("1", "Foo", "note", 7);
        let second = Item::new("2", "Foo", "todo", 9);
        let third = Item::new("3", "Foo", "todo", 11);

        let first_path = write_export(dir.path(), &first).unwrap();
        let second_path = write_export(dir.path(), &second).unwrap();
        let third_path = write_export(dir.path(), &third).unwrap();
        assert_eq!(second_path, dir.path().join("Foo (2).json"));
        assert_eq!(third_path, dir.path().join("Foo (3).json"));

        let read = |path: &Path| -> Item {
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
        };
        assert_eq!(read(&first_path), first);
        assert_eq!(read(&second_path), second);
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(load_folders(&dir.path().join("library.json"))
            .unwrap()
            .is_none());
    }
}
