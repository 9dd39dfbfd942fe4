//! Entry persistence boundary: multipart capture and grouped listing

use std::path::{Path, PathBuf};

use axum::extract::{Multipart, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, warn};
use uuid::Uuid;

use snipspace_common::capture::{
    infer_source_url, EMPTY_DRAFT_MESSAGE, IMAGE_LIMIT, IMAGE_TOO_LARGE_MESSAGE, TITLE_LIMIT,
};
use snipspace_common::db::{insert_asset, insert_entry, list_recent_entries, NewAsset, NewEntry};
use snipspace_common::filter::{available_types, filter_groups, TypeFacet};
use snipspace_common::fixtures;
use snipspace_common::group::group_entries;
use snipspace_common::model::{Entry, EntryType, GroupedEntries, View};

use crate::api::session::is_authorized;
use crate::AppState;

/// Request ceiling: image limit plus headroom for the other form fields.
pub const MAX_REQUEST_BYTES: usize = IMAGE_LIMIT + 512 * 1024;

/// Query parameters for the listing endpoint
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Dashboard view (`capture`, `today`, `timeline`)
    #[serde(default)]
    pub view: Option<String>,

    /// Free-text search over titles and content
    #[serde(default)]
    pub q: Option<String>,

    /// Type facet (`all` or one of the entry type tags)
    #[serde(rename = "type", default)]
    pub type_facet: Option<String>,
}

/// Listing response: filtered day buckets plus facet metadata
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub view: &'static str,
    /// `database` or `sample` (fallback feed)
    pub source: &'static str,
    pub total_entries: usize,
    pub types: Vec<String>,
    pub groups: Vec<GroupedEntries>,
}

/// GET /api/entries?view=timeline&q=...&type=...
///
/// Returns the 200 most-recent entries grouped by day and narrowed by the
/// query/facet. Without a session, or when the read fails or yields
/// nothing, the built-in sample set is served instead of an error.
pub async fn list_entries(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Json<ListResponse> {
    let (entries, source) = if is_authorized(&state, &headers) {
        match list_recent_entries(&state.db).await {
            Ok(rows) if !rows.is_empty() => (rows, "database"),
            Ok(_) => (fixtures::sample_entries(), "sample"),
            Err(e) => {
                error!("Failed to list entries, falling back to samples: {e}");
                (fixtures::sample_entries(), "sample")
            }
        }
    } else {
        (fixtures::sample_entries(), "sample")
    };

    let view = View::from_param(query.view.as_deref().unwrap_or(""));
    let mut groups = group_entries(entries);
    if view == View::Today {
        groups.truncate(1);
    }

    let types = available_types(&groups);
    let facet = TypeFacet::from_tag(query.type_facet.as_deref().unwrap_or("all"));
    let filtered = filter_groups(&groups, query.q.as_deref().unwrap_or(""), facet);
    let total_entries = filtered.iter().map(|group| group.entries.len()).sum();

    Json(ListResponse {
        view: view.as_str(),
        source,
        total_entries,
        types,
        groups: filtered,
    })
}

/// Image part of a capture submission
struct UploadedImage {
    file_name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

/// Raw multipart fields of a capture submission
#[derive(Default)]
struct CaptureFields {
    type_tag: Option<String>,
    content: Option<String>,
    title: Option<String>,
    source_url: Option<String>,
    image: Option<UploadedImage>,
}

/// POST /api/entries (multipart)
///
/// Accepts `type`, `content`, `title`, `sourceUrl` and `image` fields,
/// stores any image under the entry-images directory, inserts the entry
/// row and returns the canonical created entry.
pub async fn create_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Value>, EntriesError> {
    if !is_authorized(&state, &headers) {
        return Err(EntriesError::Unauthorized);
    }

    let fields = read_capture_fields(multipart).await?;

    let Some(type_tag) = fields.type_tag else {
        return Err(EntriesError::Validation("Missing content type".to_string()));
    };
    if fields.content.as_deref().unwrap_or("").is_empty() && fields.image.is_none() {
        return Err(EntriesError::Validation(EMPTY_DRAFT_MESSAGE.to_string()));
    }
    if let Some(image) = &fields.image {
        // Same ceiling the client enforces, as defense at the boundary
        if image.bytes.len() > IMAGE_LIMIT {
            return Err(EntriesError::Validation(IMAGE_TOO_LARGE_MESSAGE.to_string()));
        }
    }

    let entry_type = match EntryType::from_tag(&type_tag) {
        Some(entry_type) => entry_type,
        None => {
            warn!("Unknown type tag {type_tag:?} in capture submission, coercing to text");
            EntryType::Text
        }
    };

    let content = fields.content.unwrap_or_default();
    let title = fields
        .title
        .map(|title| truncate_chars(&title, TITLE_LIMIT))
        .filter(|title| !title.is_empty());
    let source_url = infer_source_url(entry_type, &content, fields.source_url.as_deref());

    let mut stored_image: Option<NewAsset> = None;
    let mut entry_content = content.clone();
    if let Some(image) = &fields.image {
        let storage_path = store_image(&state.images_dir, image).await.map_err(|e| {
            error!("Failed to store uploaded image: {e}");
            EntriesError::Storage("Failed to store image, try again later".to_string())
        })?;
        if entry_content.is_empty() {
            entry_content = storage_path.clone();
        }
        stored_image = Some(NewAsset {
            entry_id: String::new(),
            storage_path,
            mime_type: image.mime_type.clone(),
            size_bytes: image.bytes.len() as i64,
        });
    }

    let entry: Entry = insert_entry(
        &state.db,
        NewEntry {
            title,
            content: entry_content,
            entry_type,
            source_url,
            tags: Vec::new(),
        },
    )
    .await
    .map_err(|e| {
        error!("Failed to insert entry: {e}");
        EntriesError::Database("Failed to save entry".to_string())
    })?;

    if let Some(mut asset) = stored_image {
        asset.entry_id = entry.id.clone();
        // Asset metadata is best-effort; the entry itself is already saved
        if let Err(e) = insert_asset(&state.db, asset).await {
            error!("Failed to record asset metadata: {e}");
        }
    }

    Ok(Json(json!({ "message": "ok", "entry": entry })))
}

async fn read_capture_fields(mut multipart: Multipart) -> Result<CaptureFields, EntriesError> {
    let mut fields = CaptureFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| EntriesError::Malformed(format!("Invalid multipart body: {e}")))?
    {
        let Some(name) = field.name().map(|name| name.to_string()) else {
            continue;
        };

        match name.as_str() {
            "image" => {
                let file_name = field
                    .file_name()
                    .unwrap_or("upload")
                    .to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("image/png")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| EntriesError::Malformed(format!("Failed to read image: {e}")))?;
                fields.image = Some(UploadedImage {
                    file_name,
                    mime_type,
                    bytes: bytes.to_vec(),
                });
            }
            other => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| EntriesError::Malformed(format!("Failed to read field: {e}")))?;
                match other {
                    "type" => fields.type_tag = Some(value),
                    "content" => fields.content = Some(value),
                    "title" => fields.title = Some(value),
                    "sourceUrl" => fields.source_url = Some(value),
                    _ => {}
                }
            }
        }
    }

    Ok(fields)
}

/// Write image bytes under `<images_dir>/<day>/<uuid>.<ext>` and return the
/// relative path served below `/images`.
async fn store_image(images_dir: &Path, image: &UploadedImage) -> std::io::Result<String> {
    let day = Utc::now().format("%Y-%m-%d").to_string();
    let extension = extension_for(&image.mime_type, &image.file_name);
    let file_name = format!("{}.{}", Uuid::new_v4(), extension);

    let dir: PathBuf = images_dir.join(&day);
    tokio::fs::create_dir_all(&dir).await?;
    tokio::fs::write(dir.join(&file_name), &image.bytes).await?;

    Ok(format!("images/{day}/{file_name}"))
}

/// File extension derived from the mime subtype, falling back to the
/// uploaded file name and finally to png.
fn extension_for(mime_type: &str, file_name: &str) -> String {
    if let Some(subtype) = mime_type.strip_prefix("image/") {
        if !subtype.is_empty() {
            return match subtype {
                "jpeg" => "jpg".to_string(),
                "svg+xml" => "svg".to_string(),
                other => other.to_string(),
            };
        }
    }
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_string())
        .unwrap_or_else(|| "png".to_string())
}

fn truncate_chars(value: &str, limit: usize) -> String {
    value.chars().take(limit).collect()
}

/// Capture endpoint errors, all rendered as `{ "message": ... }` JSON
#[derive(Debug)]
pub enum EntriesError {
    Unauthorized,
    Validation(String),
    Malformed(String),
    Storage(String),
    Database(String),
}

impl IntoResponse for EntriesError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            EntriesError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Not authorized - unlock the dashboard first".to_string(),
            ),
            EntriesError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            EntriesError::Malformed(message) => (StatusCode::BAD_REQUEST, message),
            EntriesError::Storage(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
            EntriesError::Database(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
