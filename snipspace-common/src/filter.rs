//! Free-text search and type-facet filtering over grouped entries
//!
//! Operates on the output of [`crate::group::group_entries`], preserving
//! bucket order and intra-bucket order and dropping buckets that end up
//! empty so day headers never render for empty days.

use crate::model::{Entry, EntryType, GroupedEntries};

/// Type facet applied on top of free-text search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFacet {
    #[default]
    All,
    Only(EntryType),
}

impl TypeFacet {
    /// Parse a facet tag. `"all"` and unrecognized tags widen to `All`.
    pub fn from_tag(tag: &str) -> TypeFacet {
        match EntryType::from_tag(tag) {
            Some(entry_type) => TypeFacet::Only(entry_type),
            None => TypeFacet::All,
        }
    }

    fn matches(&self, entry_type: EntryType) -> bool {
        match self {
            TypeFacet::All => true,
            TypeFacet::Only(only) => *only == entry_type,
        }
    }
}

fn entry_matches(entry: &Entry, needle: &str, facet: TypeFacet) -> bool {
    if !facet.matches(entry.entry_type) {
        return false;
    }
    if needle.is_empty() {
        return true;
    }
    let title_match = entry
        .title
        .as_deref()
        .map(|title| title.to_lowercase().contains(needle))
        .unwrap_or(false);
    title_match || entry.content.to_lowercase().contains(needle)
}

/// Narrow grouped entries by query and facet.
///
/// Retains entries whose type matches the facet and whose lowercased title
/// or content contains the lowercased query. Buckets with no surviving
/// entries are omitted entirely.
pub fn filter_groups(
    groups: &[GroupedEntries],
    query: &str,
    facet: TypeFacet,
) -> Vec<GroupedEntries> {
    let needle = query.trim().to_lowercase();

    groups
        .iter()
        .filter_map(|group| {
            let entries: Vec<Entry> = group
                .entries
                .iter()
                .filter(|entry| entry_matches(entry, &needle, facet))
                .cloned()
                .collect();
            if entries.is_empty() {
                None
            } else {
                Some(GroupedEntries {
                    day: group.day.clone(),
                    entries,
                })
            }
        })
        .collect()
}

/// Distinct type tags present across the (unfiltered) buckets, in first-seen
/// order, always prefixed with the synthetic `"all"` facet.
pub fn available_types(groups: &[GroupedEntries]) -> Vec<String> {
    let mut types = vec!["all".to_string()];
    for group in groups {
        for entry in &group.entries {
            let tag = entry.entry_type.as_str();
            if !types.iter().any(|existing| existing == tag) {
                types.push(tag.to_string());
            }
        }
    }
    types
}
