//! Generic first-seen-order grouping.
//!
//! The agenda view clusters events by calendar day, where "same day" only
//! compares the date portion of two timestamps. Because equality is
//! caller-supplied and not necessarily hash-compatible, groups are found
//! by a linear scan rather than a hash map; group count stays tiny here
//! (a handful of days), so O(n·g) is fine.

/// A group key together with the elements that mapped to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<K, T> {
    pub key: K,
    pub elements: Vec<T>,
}

/// Group elements by a derived key, using `==` on keys.
pub fn group_by<I, K, F>(items: I, key_fn: F) -> Vec<Group<K, I::Item>>
where
    I: IntoIterator,
    K: PartialEq,
    F: Fn(&I::Item) -> K,
{
    group_by_with(items, key_fn, |a, b| a == b)
}

/// Group elements by a derived key with custom key equality.
///
/// Groups appear in the order their key was first seen; elements within a
/// group keep input order. Each element joins the first existing group
/// whose key matches, or starts a new group at the end.
pub fn group_by_with<I, K, F, E>(items: I, key_fn: F, keys_equal: E) -> Vec<Group<K, I::Item>>
where
    I: IntoIterator,
    F: Fn(&I::Item) -> K,
    E: Fn(&K, &K) -> bool,
{
    let mut groups: Vec<Group<K, I::Item>> = Vec::new();

    for item in items {
        let key = key_fn(&item);
        match groups.iter_mut().find(|group| keys_equal(&group.key, &key)) {
            Some(group) => group.elements.push(item),
            None => groups.push(Group {
                key,
                elements: vec![item],
            }),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn datetime(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 2, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_groups_keep_first_seen_order() {
        let groups = group_by(vec!["apple", "avocado", "banana", "apricot"], |s| {
            s.as_bytes()[0]
        });

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, b'a');
        assert_eq!(groups[0].elements, vec!["apple", "avocado", "apricot"]);
        assert_eq!(groups[1].elements, vec!["banana"]);
    }

    #[test]
    fn test_custom_equality_compares_only_the_date() {
        // Timestamps differ, but three of them share a calendar day.
        let times = vec![datetime(10, 18), datetime(11, 8), datetime(11, 13), datetime(11, 18)];

        let groups = group_by_with(times, |t| *t, |a, b| a.date() == b.date());

        assert_eq!(groups.len(), 2);
        // The key is the first timestamp seen for that day.
        assert_eq!(groups[1].key, datetime(11, 8));
        assert_eq!(groups[1].elements.len(), 3);
    }

    #[test]
    fn test_grouping_is_idempotent() {
        let times = vec![datetime(10, 18), datetime(11, 8), datetime(10, 20), datetime(12, 9)];
        let same_day = |a: &NaiveDateTime, b: &NaiveDateTime| a.date() == b.date();

        let first = group_by_with(times, |t| *t, same_day);
        let flattened: Vec<NaiveDateTime> = first
            .iter()
            .flat_map(|group| group.elements.iter().copied())
            .collect();
        let second = group_by_with(flattened, |t| *t, same_day);

        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input() {
        let groups = group_by(Vec::<i32>::new(), |n| *n);
        assert!(groups.is_empty());
    }
}
