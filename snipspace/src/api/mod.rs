//! HTTP API handlers for snipspace

pub mod entries;
pub mod health;
pub mod session;
pub mod ui;

pub use entries::{create_entry, list_entries};
pub use health::health_routes;
pub use session::create_session;
pub use ui::{serve_app_js, serve_index};
