//! Access boundary: password unlock and session cookies
//!
//! A successful unlock issues an opaque random token, recorded in the
//! in-memory session set and handed back as an HttpOnly cookie. No
//! rotation, no expiry. When no password hash is configured, access
//! checks are disabled entirely.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use snipspace_common::auth::{generate_session_token, verify_password, SESSION_COOKIE};

use crate::AppState;

/// Unlock request body
#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    #[serde(default)]
    password: String,
}

/// POST /api/session
///
/// Verifies the submitted password and establishes a session credential.
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<UnlockRequest>,
) -> Response {
    if request.password.is_empty() {
        return message_response(StatusCode::BAD_REQUEST, "Password is required");
    }

    let accepted = match &state.access_hash {
        Some(stored) => verify_password(&request.password, stored),
        // No password configured: the dashboard runs unlocked
        None => true,
    };

    if !accepted {
        warn!("Rejected unlock attempt");
        return message_response(StatusCode::UNAUTHORIZED, "Incorrect password");
    }

    let token = generate_session_token();
    if let Ok(mut sessions) = state.sessions.write() {
        sessions.insert(token.clone());
    }
    info!("Issued dashboard session");

    let cookie = format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/");
    (
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "status": "ok" })),
    )
        .into_response()
}

/// Extract the session token from the request cookies, if present.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

/// Whether the request carries a valid session. Always true when access
/// checks are disabled.
pub fn is_authorized(state: &AppState, headers: &HeaderMap) -> bool {
    if state.access_hash.is_none() {
        return true;
    }
    match session_token(headers) {
        Some(token) => state
            .sessions
            .read()
            .map(|sessions| sessions.contains(&token))
            .unwrap_or(false),
        None => false,
    }
}

pub(crate) fn message_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}
