//! snipspace library - clipping dashboard web service
//!
//! Hosts the entry persistence and access boundaries behind an axum router
//! and serves the embedded dashboard UI. Uploaded images land in a local
//! directory exposed read-only under `/images`.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use axum::Router;
use sqlx::SqlitePool;
use tower_http::services::ServeDir;

pub mod api;
pub mod client;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Encoded access password hash; `None` disables access checks
    pub access_hash: Option<String>,
    /// Issued session tokens
    pub sessions: Arc<RwLock<HashSet<String>>>,
    /// Directory receiving uploaded entry images
    pub images_dir: PathBuf,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, access_hash: Option<String>, images_dir: PathBuf) -> Self {
        Self {
            db,
            access_hash,
            sessions: Arc::new(RwLock::new(HashSet::new())),
            images_dir,
        }
    }
}

/// Build application router
///
/// Listing, unlock, health and the embedded UI are public; the capture
/// endpoint checks the session itself and the listing degrades to sample
/// data when no session exists.
pub fn build_router(state: AppState) -> Router {
    use axum::extract::DefaultBodyLimit;
    use axum::routing::{get, post};

    Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .route(
            "/api/entries",
            get(api::list_entries).post(api::create_entry),
        )
        .route("/api/session", post(api::create_session))
        .merge(api::health_routes())
        .nest_service("/images", ServeDir::new(state.images_dir.clone()))
        .layer(DefaultBodyLimit::max(api::entries::MAX_REQUEST_BYTES))
        .with_state(state)
}
