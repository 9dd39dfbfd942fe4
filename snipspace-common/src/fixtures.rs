//! Built-in sample timeline
//!
//! Used whenever the listing boundary has nothing to offer: no session,
//! empty table, or a failed read. Keeps the grouping/filter/classification
//! pipeline fed with data instead of erroring.

use chrono::{Duration, SecondsFormat, Utc};

use crate::group::group_entries;
use crate::model::{Entry, EntryType, GroupedEntries};

fn stamp(days_ago: i64, hours_ago: i64) -> String {
    (Utc::now() - Duration::days(days_ago) - Duration::hours(hours_ago))
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn sample(
    id: &str,
    title: Option<&str>,
    content: &str,
    entry_type: EntryType,
    source_url: Option<&str>,
    created_at: String,
    tags: &[&str],
) -> Entry {
    Entry {
        id: id.to_string(),
        title: title.map(|t| t.to_string()),
        content: content.to_string(),
        entry_type,
        source_url: source_url.map(|u| u.to_string()),
        created_at,
        tags: if tags.is_empty() {
            None
        } else {
            Some(tags.iter().map(|t| t.to_string()).collect())
        },
    }
}

/// Sample entries covering all six types, spread over the last three days,
/// most recent first to mirror the listing boundary's ordering.
pub fn sample_entries() -> Vec<Entry> {
    vec![
        sample(
            "sample-1",
            Some("A line worth keeping"),
            "Stay curious, embrace change, and write the good ideas down before they fade.",
            EntryType::Text,
            None,
            stamp(0, 1),
            &["quote", "inspiration"],
        ),
        sample(
            "sample-2",
            Some("Edge functions guide"),
            "https://supabase.com/docs/guides/functions",
            EntryType::Link,
            Some("https://supabase.com/docs/guides/functions"),
            stamp(0, 3),
            &["reading"],
        ),
        sample(
            "sample-3",
            Some("Debounce helper"),
            "```ts\nconst debounce = (fn, ms) => {\n  let t;\n  return (...a) => { clearTimeout(t); t = setTimeout(() => fn(...a), ms); };\n};\n```",
            EntryType::Snippet,
            None,
            stamp(1, 2),
            &["snippet"],
        ),
        sample(
            "sample-4",
            Some("Talk: simple made easy"),
            "https://www.youtube.com/watch?v=SxdOUGdseq4",
            EntryType::Video,
            Some("https://www.youtube.com/watch?v=SxdOUGdseq4"),
            stamp(1, 5),
            &[],
        ),
        sample(
            "sample-5",
            Some("Whiteboard photo"),
            "images/sample/whiteboard.png",
            EntryType::Image,
            None,
            stamp(2, 1),
            &[],
        ),
        sample(
            "sample-6",
            Some("Meeting recap"),
            "Long-form recap of the planning session: we agreed to keep the capture flow \
             single-draft, defer tag editing, move the timeline search client-side, and \
             revisit image thumbnails once storage settles. Follow-ups were assigned and \
             the next checkpoint is in two weeks. Notes below cover the open questions \
             raised about grouping, facets, and the sample data fallback behavior.",
            EntryType::Mixed,
            None,
            stamp(2, 4),
            &["meeting"],
        ),
    ]
}

/// Sample entries pre-grouped into day buckets.
pub fn sample_groups() -> Vec<GroupedEntries> {
    group_entries(sample_entries())
}
