//! Data model: entries, day buckets, and dashboard views

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of content types an entry can carry.
///
/// Values arriving from outside this set are coerced to `Text` at the
/// boundary rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    #[default]
    Text,
    Link,
    Image,
    Video,
    Snippet,
    Mixed,
}

impl EntryType {
    /// Wire tag for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Text => "text",
            EntryType::Link => "link",
            EntryType::Image => "image",
            EntryType::Video => "video",
            EntryType::Snippet => "snippet",
            EntryType::Mixed => "mixed",
        }
    }

    /// Parse a wire tag. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<EntryType> {
        match tag {
            "text" => Some(EntryType::Text),
            "link" => Some(EntryType::Link),
            "image" => Some(EntryType::Image),
            "video" => Some(EntryType::Video),
            "snippet" => Some(EntryType::Snippet),
            "mixed" => Some(EntryType::Mixed),
            _ => None,
        }
    }

    /// Parse a wire tag, coercing unknown values to `Text`.
    pub fn from_tag_lossy(tag: &str) -> EntryType {
        EntryType::from_tag(tag).unwrap_or(EntryType::Text)
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single captured clipping.
///
/// `id` and `created_at` are assigned by the persistence boundary at creation
/// and never change afterwards. Optional fields serialize as absent rather
/// than as empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// One calendar day of entries on the timeline.
///
/// A derived view: recomputed from the flat entry list on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedEntries {
    pub day: String,
    pub entries: Vec<Entry>,
}

/// Dashboard view identifiers.
///
/// The set of valid views is closed; callers pass one of these explicitly
/// instead of mutating ambient view state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Capture,
    Today,
    #[default]
    Timeline,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Capture => "capture",
            View::Today => "today",
            View::Timeline => "timeline",
        }
    }

    /// Parse a view query parameter, defaulting to the full timeline.
    pub fn from_param(value: &str) -> View {
        match value {
            "capture" => View::Capture,
            "today" => View::Today,
            _ => View::Timeline,
        }
    }
}
