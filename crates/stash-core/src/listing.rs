//! Grouping, recency and search over items.

use crate::item::{Folders, Item};
use crate::sort::{sort_by_keys, Direction, SortValue};

/// Items shown in the "Latest" section of a folder.
pub const LATEST_COUNT: usize = 3;

/// Items sharing one group label, most recent first.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemGroup<T> {
    /// Group label; `""` for items without a group.
    pub label: String,
    pub items: Vec<T>,
}

impl<T> ItemGroup<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Anything that exposes an [`Item`].
pub trait AsItem {
    fn item(&self) -> &Item;
}

impl AsItem for Item {
    fn item(&self) -> &Item {
        self
    }
}

/// An item tagged with the folder it lives in.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderItem {
    pub folder: String,
    pub item: Item,
}

impl AsItem for FolderItem {
    fn item(&self) -> &Item {
        &self.item
    }
}

fn by_latest<T: AsItem>(entry: &T) -> (SortValue<'_>, Direction) {
    (SortValue::Int(entry.item().last_updated), Direction::Desc)
}

/// Sort by `last_updated` descending, ties in input order.
pub fn sort_by_latest<T: AsItem + Clone>(items: &[T]) -> Vec<T> {
    sort_by_keys(items, &[by_latest::<T>])
}

/// The `count` most recently updated items.
pub fn latest<T: AsItem + Clone>(items: &[T], count: usize) -> Vec<T> {
    let mut sorted = sort_by_latest(items);
    sorted.truncate(count);
    sorted
}

/// Partition items by group label.
///
/// Groups appear in order of first occurrence; items inside a group are
/// sorted most recent first.
pub fn group_items<T: AsItem + Clone>(items: &[T]) -> Vec<ItemGroup<T>> {
    let mut groups: Vec<ItemGroup<T>> = Vec::new();

    for entry in items {
        let label = entry.item().group_label();
        match groups.iter_mut().find(|g| g.label == label) {
            Some(group) => group.items.push(entry.clone()),
            None => groups.push(ItemGroup {
                label: label.to_string(),
                items: vec![entry.clone()],
            }),
        }
    }

    for group in &mut groups {
        group.items = sort_by_latest(&group.items);
    }
    groups
}

/// Case-insensitive substring match on name or group.
pub fn matches_search(item: &Item, term: &str) -> bool {
    let term = term.to_lowercase();
    item.name.to_lowercase().contains(&term) || item.group_label().to_lowercase().contains(&term)
}

/// Every item of every folder matching `term`, in folder order.
pub fn search(folders: &Folders, term: &str) -> Vec<FolderItem> {
    let results: Vec<FolderItem> = folders
        .flatten()
        .filter(|(_, item)| matches_search(item, term))
        .map(|(folder, item)| FolderItem {
            folder: folder.to_string(),
            item: item.clone(),
        })
        .collect();

    tracing::debug!("search '{}': {} matches", term, results.len());
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, name: &str, group: Option<&str>, last_updated: i64) -> Item {
        let item = Item::new(id, name, "x", last_updated);
        match group {
            Some(g) => item.with_group(g),
            None => item,
        }
    }

    fn names<T: AsItem>(items: &[T]) -> Vec<&str> {
        items.iter().map(|e| e.item().name.as_str()).collect()
    }

    #[test]
    fn test_latest_takes_top_three() {
        let items = vec![
            item("1", "a", None, 1),
            item("2", "b", None, 5),
            item("3", "c", None, 3),
            item("4", "d", None, 4),
        ];
        let top = latest(&items, LATEST_COUNT);
        assert_eq!(names(&top), vec!["b", "d", "c"]);
    }

    #[test]
    fn test_latest_short_and_empty() {
        let items = vec![item("1", "a", None, 1), item("2", "b", None, 2)];
        assert_eq!(names(&latest(&items, LATEST_COUNT)), vec!["b", "a"]);
        assert!(latest::<Item>(&[], LATEST_COUNT).is_empty());
    }

    #[test]
    fn test_group_order_is_first_occurrence() {
        let items = vec![
            item("1", "a", Some("beta"), 1),
            item("2", "b", None, 2),
            item("3", "c", Some("alpha"), 3),
            item("4", "d", Some("beta"), 4),
        ];
        let groups = group_items(&items);
        let labels: Vec<_> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["beta", "", "alpha"]);
        assert_eq!(names(&groups[0].items), vec!["d", "a"]);
    }

    #[test]
    fn test_grouping_partitions_every_item() {
        let items: Vec<Item> = (0..20)
            .map(|i| {
                let group = ["g1", "g2", "g3"].get(i % 4).copied();
                item(&i.to_string(), &format!("n{i}"), group, ((i * 7) % 11) as i64)
            })
            .collect();

        let groups = group_items(&items);
        let total: usize = groups.iter().map(ItemGroup::len).sum();
        assert_eq!(total, items.len());

        for group in &groups {
            assert!(group
                .items
                .iter()
                .all(|i| i.group_label() == group.label));
            assert!(group
                .items
                .windows(2)
                .all(|w| w[0].last_updated >= w[1].last_updated));
        }
    }

    #[test]
    fn test_empty_group_label_and_missing_group_merge() {
        let items = vec![item("1", "a", None, 1), item("2", "b", Some(""), 2)];
        let groups = group_items(&items);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label, "");
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn test_search_matches_name_or_group() {
        let foo = item("1", "Foo", Some("g1"), 10);
        assert!(matches_search(&foo, "foo"));
        assert!(matches_search(&foo, "OO"));
        assert!(matches_search(&foo, "G1"));
        assert!(!matches_search(&foo, "bar"));

        let ungrouped = item("2", "Bar", None, 1);
        assert!(!matches_search(&ungrouped, "g"));
    }

    #[test]
    fn test_search_spans_folders_in_order() {
        let folders: Folders = vec![
            ("A".to_string(), vec![item("1", "Foo", Some("g1"), 10), item("2", "Bar", Some("g1"), 20)]),
            ("B".to_string(), vec![item("3", "Food", None, 5)]),
        ]
        .into_iter()
        .collect();

        let results = search(&folders, "foo");
        assert_eq!(names(&results), vec!["Foo", "Food"]);
        assert_eq!(results[0].folder, "A");
        assert_eq!(results[1].folder, "B");
    }
}
