//! Entry and asset storage
//!
//! Rows are loosely typed in SQLite; every row is run through an explicit
//! parse-and-coerce step on the way out, with unknown content types
//! defaulting to `text` instead of erroring.

use chrono::{SecondsFormat, Utc};
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{Entry, EntryType};

/// Listing window: the 200 most-recent entries.
pub const LIST_LIMIT: i64 = 200;

/// Fields of an entry about to be persisted. `id` and `created_at` are
/// assigned here, at the boundary.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub title: Option<String>,
    pub content: String,
    pub entry_type: EntryType,
    pub source_url: Option<String>,
    pub tags: Vec<String>,
}

/// Stored image metadata recorded alongside an entry.
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub entry_id: String,
    pub storage_path: String,
    pub mime_type: String,
    pub size_bytes: i64,
}

/// Raw entries row as stored.
#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    id: String,
    title: Option<String>,
    content: String,
    content_type: String,
    source_url: Option<String>,
    created_at: String,
    tags: Option<String>,
}

impl EntryRow {
    /// Coerce a loosely-typed row into the closed Entry shape.
    fn into_entry(self) -> Entry {
        let entry_type = match EntryType::from_tag(&self.content_type) {
            Some(entry_type) => entry_type,
            None => {
                warn!(
                    "Unknown content_type {:?} on entry {}, coercing to text",
                    self.content_type, self.id
                );
                EntryType::Text
            }
        };
        let tags = self
            .tags
            .as_deref()
            .and_then(|raw| serde_json::from_str::<Vec<String>>(raw).ok());

        Entry {
            id: self.id,
            title: self.title,
            content: self.content,
            entry_type,
            source_url: self.source_url,
            created_at: self.created_at,
            tags,
        }
    }
}

/// Insert a new entry, assigning its id and timestamps. Returns the
/// canonical stored entry.
pub async fn insert_entry(db: &SqlitePool, new: NewEntry) -> Result<Entry> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();
    let created_at = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    let created_day = now.format("%Y-%m-%d").to_string();
    let tags_json = serde_json::to_string(&new.tags)
        .map_err(|e| Error::Internal(format!("Failed to encode tags: {e}")))?;

    sqlx::query(
        "INSERT INTO entries (id, title, content, content_type, source_url, created_at, created_day, tags)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&new.title)
    .bind(&new.content)
    .bind(new.entry_type.as_str())
    .bind(&new.source_url)
    .bind(&created_at)
    .bind(&created_day)
    .bind(&tags_json)
    .execute(db)
    .await?;

    Ok(Entry {
        id,
        title: new.title,
        content: new.content,
        entry_type: new.entry_type,
        source_url: new.source_url,
        created_at,
        tags: Some(new.tags),
    })
}

/// The most-recent entries, newest first, coerced into the closed model.
pub async fn list_recent_entries(db: &SqlitePool) -> Result<Vec<Entry>> {
    let rows: Vec<EntryRow> = sqlx::query_as(
        "SELECT id, title, content, content_type, source_url, created_at, tags
         FROM entries
         ORDER BY created_at DESC
         LIMIT ?",
    )
    .bind(LIST_LIMIT)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(EntryRow::into_entry).collect())
}

/// Record stored-image metadata for an entry.
pub async fn insert_asset(db: &SqlitePool, asset: NewAsset) -> Result<()> {
    sqlx::query(
        "INSERT INTO assets (id, entry_id, storage_path, mime_type, size_bytes)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&asset.entry_id)
    .bind(&asset.storage_path)
    .bind(&asset.mime_type)
    .bind(asset.size_bytes)
    .execute(db)
    .await?;
    Ok(())
}
