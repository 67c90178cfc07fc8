//! Item and folder types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A saved item.
///
/// Items are owned by the library; views only read them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier across the whole library.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Last modification time in milliseconds since the Unix epoch.
    #[serde(rename = "lastUpdated")]
    pub last_updated: i64,

    /// Optional sub-partition label used to cluster items in listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Free-form type label shown in search results.
    #[serde(rename = "type")]
    pub kind: String,
}

impl Item {
    /// Create a new item with required fields.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<String>,
        last_updated: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            last_updated,
            group: None,
            kind: kind.into(),
        }
    }

    /// Set the group label.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Group label with an absent group normalized to `""`.
    pub fn group_label(&self) -> &str {
        self.group.as_deref().unwrap_or("")
    }
}

/// Folder name to items, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Folders(IndexMap<String, Vec<Item>>);

impl Folders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folder names in mapping order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Items of a folder, `None` if the folder does not exist.
    pub fn get(&self, folder: &str) -> Option<&[Item]> {
        self.0.get(folder).map(Vec::as_slice)
    }

    pub fn get_mut(&mut self, folder: &str) -> Option<&mut Vec<Item>> {
        self.0.get_mut(folder)
    }

    /// Items of a folder, empty when the folder does not exist.
    pub fn items(&self, folder: &str) -> &[Item] {
        self.get(folder).unwrap_or(&[])
    }

    /// Insert a folder, keeping its position if it already exists.
    pub fn insert(&mut self, folder: impl Into<String>, items: Vec<Item>) {
        self.0.insert(folder.into(), items);
    }

    /// Ensure a folder exists, appending it empty if missing.
    pub fn ensure(&mut self, folder: &str) -> &mut Vec<Item> {
        self.0.entry(folder.to_string()).or_default()
    }

    pub fn contains(&self, folder: &str) -> bool {
        self.0.contains_key(folder)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(folder, items)` pairs in mapping order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Item])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Every item of every folder, tagged with its folder, in mapping order.
    pub fn flatten(&self) -> impl Iterator<Item = (&str, &Item)> {
        self.iter()
            .flat_map(|(folder, items)| items.iter().map(move |item| (folder, item)))
    }

    /// Total number of items across all folders.
    pub fn item_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Find the folder holding an item id.
    pub fn folder_of(&self, id: &str) -> Option<&str> {
        self.flatten()
            .find(|(_, item)| item.id == id)
            .map(|(folder, _)| folder)
    }
}

impl FromIterator<(String, Vec<Item>)> for Folders {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Item>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_json_field_names() {
        let item = Item::new("1", "Foo", "x", 10).with_group("g1");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["lastUpdated"], 10);
        assert_eq!(json["type"], "x");
        assert_eq!(json["group"], "g1");

        let bare: Item =
            serde_json::from_str(r#"{"id":"2","name":"Bar","lastUpdated":5,"type":"y"}"#).unwrap();
        assert_eq!(bare.group, None);
        assert_eq!(bare.group_label(), "");
    }

    #[test]
    fn test_folders_keep_insertion_order() {
        let mut folders = Folders::new();
        folders.insert("Zeta", vec![]);
        folders.insert("Alpha", vec![]);
        folders.insert("Mid", vec![]);

        let names: Vec<_> = folders.names().collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);

        let json = serde_json::to_string(&folders).unwrap();
        let back: Folders = serde_json::from_str(&json).unwrap();
        assert_eq!(back.names().collect::<Vec<_>>(), names);
    }

    #[test]
    fn test_missing_folder_is_empty() {
        let folders = Folders::new();
        assert!(folders.get("nope").is_none());
        assert!(folders.items("nope").is_empty());
    }

    #[test]
    fn test_flatten_and_folder_of() {
        let folders: Folders = vec![
            ("A".to_string(), vec![Item::new("1", "Foo", "x", 1)]),
            (
                "B".to_string(),
                vec![Item::new("2", "Bar", "x", 2), Item::new("3", "Baz", "x", 3)],
            ),
        ]
        .into_iter()
        .collect();

        let ids: Vec<_> = folders.flatten().map(|(_, i)| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(folders.item_count(), 3);
        assert_eq!(folders.folder_of("3"), Some("B"));
        assert_eq!(folders.folder_of("9"), None);
    }
}
