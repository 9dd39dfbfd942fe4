//! Chronological grouping of flat entry lists into day buckets
//!
//! A derived view over the listing feed: no entry is dropped or duplicated,
//! within-day arrival order is preserved, and buckets come out most recent
//! day first.

use crate::model::{Entry, GroupedEntries};

/// Date portion of an RFC 3339 timestamp (the text before `T`).
fn day_of(created_at: &str) -> &str {
    created_at.split('T').next().unwrap_or(created_at)
}

/// Partition entries into day buckets sorted descending by day.
///
/// Empty input yields empty output. Fixed-width ISO dates make plain
/// string comparison sufficient for the sort.
pub fn group_entries(entries: Vec<Entry>) -> Vec<GroupedEntries> {
    let mut groups: Vec<GroupedEntries> = Vec::new();

    for entry in entries {
        let day = day_of(&entry.created_at);
        match groups.iter_mut().find(|group| group.day == day) {
            Some(group) => group.entries.push(entry),
            None => groups.push(GroupedEntries {
                day: day.to_string(),
                entries: vec![entry],
            }),
        }
    }

    groups.sort_by(|a, b| b.day.cmp(&a.day));
    groups
}
