//! Stable multi-key sorting.
//!
//! Each key maps an item to a [`SortValue`] and a [`Direction`]. Keys are
//! compared in order; items that tie on every key keep their input order.

use std::cmp::Ordering;

/// Sort direction for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// A comparable value produced by a sort key.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum SortValue<'a> {
    Int(i64),
    Text(&'a str),
}

/// A sort key: extracts a value and the direction to order it in.
pub type SortKey<T> = for<'a> fn(&'a T) -> (SortValue<'a>, Direction);

/// Sort a copy of `items` by `keys`, stable for ties.
pub fn sort_by_keys<T: Clone>(items: &[T], keys: &[SortKey<T>]) -> Vec<T> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| compare(a, b, keys));
    sorted
}

fn compare<T>(a: &T, b: &T, keys: &[SortKey<T>]) -> Ordering {
    for key in keys {
        let (va, direction) = key(a);
        let (vb, _) = key(b);
        let ordering = va.partial_cmp(&vb).unwrap_or(Ordering::Equal);
        let ordering = match direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        n: i64,
        s: &'static str,
    }

    fn by_n_desc(r: &Row) -> (SortValue<'_>, Direction) {
        (SortValue::Int(r.n), Direction::Desc)
    }

    fn by_s_asc(r: &Row) -> (SortValue<'_>, Direction) {
        (SortValue::Text(r.s), Direction::Asc)
    }

    #[test]
    fn test_single_key_desc() {
        let rows = vec![Row { n: 1, s: "a" }, Row { n: 3, s: "b" }, Row { n: 2, s: "c" }];
        let sorted = sort_by_keys(&rows, &[by_n_desc]);
        let ns: Vec<_> = sorted.iter().map(|r| r.n).collect();
        assert_eq!(ns, vec![3, 2, 1]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let rows = vec![Row { n: 5, s: "first" }, Row { n: 5, s: "second" }, Row { n: 9, s: "top" }];
        let sorted = sort_by_keys(&rows, &[by_n_desc]);
        let ss: Vec<_> = sorted.iter().map(|r| r.s).collect();
        assert_eq!(ss, vec!["top", "first", "second"]);
    }

    #[test]
    fn test_second_key_breaks_ties() {
        let rows = vec![Row { n: 1, s: "b" }, Row { n: 1, s: "a" }, Row { n: 2, s: "z" }];
        let sorted = sort_by_keys(&rows, &[by_n_desc, by_s_asc]);
        let ss: Vec<_> = sorted.iter().map(|r| r.s).collect();
        assert_eq!(ss, vec!["z", "a", "b"]);
    }

    #[test]
    fn test_input_untouched() {
        let rows = vec![Row { n: 1, s: "a" }, Row { n: 2, s: "b" }];
        let _ = sort_by_keys(&rows, &[by_n_desc]);
        assert_eq!(rows[0].n, 1);
    }
}
