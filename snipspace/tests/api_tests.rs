//! Integration tests for the snipspace API endpoints
//!
//! Covers the health endpoint, the access boundary (unlock + sessions),
//! the capture endpoint's validation and persistence, and the grouped
//! listing with its sample-data fallback.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot` method

use snipspace::{build_router, AppState};
use snipspace_common::auth::encode_access_hash;
use snipspace_common::capture::IMAGE_LIMIT;
use snipspace_common::db::init_database;

const PASSWORD: &str = "open sesame";

/// Test helper: fresh app over a temp database. `locked` configures an
/// access password; unlocked apps behave as if no password is set.
async fn setup_app(locked: bool) -> (Router, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("Should create temp dir");
    let pool = init_database(&tmp.path().join("snipspace.db"))
        .await
        .expect("Should initialize database");
    let access_hash = locked.then(|| encode_access_hash(PASSWORD));
    let state = AppState::new(pool, access_hash, tmp.path().join("entry-images"));
    (build_router(state), tmp)
}

/// Test helper: extract JSON body from a response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Test helper: unlock and return the session cookie value
async fn unlock(app: &Router) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/api/session")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(format!(r#"{{"password":"{PASSWORD}"}}"#)))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Should set session cookie")
        .to_str()
        .unwrap();
    cookie
        .split(';')
        .next()
        .expect("Cookie should have a name=value part")
        .to_string()
}

const BOUNDARY: &str = "snipspace-test-boundary";

/// Test helper: hand-rolled multipart body for the capture endpoint
fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, mime_type, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: {mime_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn capture_request(cookie: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/entries")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

fn list_request(cookie: Option<&str>, uri: &str) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

// =============================================================================
// Health Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_session_required() {
    let (app, _tmp) = setup_app(true).await;

    let request = list_request(None, "/health");
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "snipspace");
    assert!(body["version"].is_string());
}

// =============================================================================
// Access Boundary Tests
// =============================================================================

#[tokio::test]
async fn test_unlock_rejects_wrong_password() {
    let (app, _tmp) = setup_app(true).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/session")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"password":"nope"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["message"], "Incorrect password");
}

#[tokio::test]
async fn test_unlock_rejects_empty_password() {
    let (app, _tmp) = setup_app(true).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/session")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"password":""}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unlock_issues_session_cookie() {
    let (app, _tmp) = setup_app(true).await;
    let cookie = unlock(&app).await;
    assert!(cookie.starts_with("snipspace_session="));
}

// =============================================================================
// Capture Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_capture_requires_session() {
    let (app, _tmp) = setup_app(true).await;

    let body = multipart_body(&[("type", "text"), ("content", "a note")], None);
    let response = app.oneshot(capture_request(None, body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["message"], "Not authorized - unlock the dashboard first");
}

#[tokio::test]
async fn test_capture_rejects_missing_type() {
    let (app, _tmp) = setup_app(true).await;
    let cookie = unlock(&app).await;

    let body = multipart_body(&[("content", "a note")], None);
    let response = app
        .oneshot(capture_request(Some(&cookie), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["message"], "Missing content type");
}

#[tokio::test]
async fn test_capture_rejects_empty_draft() {
    let (app, _tmp) = setup_app(true).await;
    let cookie = unlock(&app).await;

    let body = multipart_body(&[("type", "text"), ("content", "")], None);
    let response = app
        .oneshot(capture_request(Some(&cookie), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["message"], "Provide text content or an image");
}

#[tokio::test]
async fn test_capture_image_limit_boundary() {
    let (app, _tmp) = setup_app(true).await;
    let cookie = unlock(&app).await;

    // One byte over the ceiling is refused
    let oversized = vec![0u8; IMAGE_LIMIT + 1];
    let body = multipart_body(
        &[("type", "image"), ("content", "")],
        Some(("big.png", "image/png", &oversized)),
    );
    let response = app
        .clone()
        .oneshot(capture_request(Some(&cookie), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = extract_json(response.into_body()).await;
    assert_eq!(json["message"], "Image exceeds the 10 MiB limit");

    // Exactly at the ceiling is accepted
    let exact = vec![0u8; IMAGE_LIMIT];
    let body = multipart_body(
        &[("type", "image"), ("content", "")],
        Some(("ok.png", "image/png", &exact)),
    );
    let response = app
        .oneshot(capture_request(Some(&cookie), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_capture_text_entry_round_trip() {
    let (app, _tmp) = setup_app(true).await;
    let cookie = unlock(&app).await;

    let body = multipart_body(
        &[("type", "text"), ("content", "remember the milk"), ("title", "Groceries")],
        None,
    );
    let response = app
        .clone()
        .oneshot(capture_request(Some(&cookie), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = extract_json(response.into_body()).await;
    assert_eq!(json["message"], "ok");
    let entry = &json["entry"];
    assert!(entry["id"].is_string());
    assert_eq!(entry["type"], "text");
    assert_eq!(entry["title"], "Groceries");
    assert!(entry["createdAt"].is_string());
    assert!(entry.get("sourceUrl").is_none());

    // The new entry shows up in the database-backed listing
    let response = app
        .oneshot(list_request(Some(&cookie), "/api/entries"))
        .await
        .unwrap();
    let json = extract_json(response.into_body()).await;
    assert_eq!(json["source"], "database");
    assert_eq!(json["total_entries"], 1);
    assert_eq!(json["groups"][0]["entries"][0]["content"], "remember the milk");
}

#[tokio::test]
async fn test_capture_link_entry_mirrors_source_url() {
    let (app, _tmp) = setup_app(true).await;
    let cookie = unlock(&app).await;

    let body = multipart_body(
        &[
            ("type", "link"),
            ("content", "https://example.com/page"),
            ("sourceUrl", "https://example.com/page"),
        ],
        None,
    );
    let response = app
        .oneshot(capture_request(Some(&cookie), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = extract_json(response.into_body()).await;
    assert_eq!(json["entry"]["sourceUrl"], "https://example.com/page");
}

#[tokio::test]
async fn test_capture_title_truncated_to_200_chars() {
    let (app, _tmp) = setup_app(true).await;
    let cookie = unlock(&app).await;

    let long_title = "t".repeat(250);
    let body = multipart_body(&[("type", "text"), ("content", "x"), ("title", &long_title)], None);
    let response = app
        .oneshot(capture_request(Some(&cookie), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = extract_json(response.into_body()).await;
    assert_eq!(json["entry"]["title"].as_str().unwrap().len(), 200);
}

#[tokio::test]
async fn test_capture_unknown_type_coerced_to_text() {
    let (app, _tmp) = setup_app(true).await;
    let cookie = unlock(&app).await;

    let body = multipart_body(&[("type", "bookmark"), ("content", "drifting")], None);
    let response = app
        .oneshot(capture_request(Some(&cookie), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = extract_json(response.into_body()).await;
    assert_eq!(json["entry"]["type"], "text");
}

#[tokio::test]
async fn test_capture_image_persists_file_and_asset_row() {
    let (app, tmp) = setup_app(true).await;
    let cookie = unlock(&app).await;

    let pixels = vec![7u8; 2048];
    let body = multipart_body(
        &[("type", "image"), ("content", "")],
        Some(("shot.png", "image/png", &pixels)),
    );
    let response = app
        .clone()
        .oneshot(capture_request(Some(&cookie), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = extract_json(response.into_body()).await;
    let content = json["entry"]["content"].as_str().unwrap();
    assert!(content.starts_with("images/"));
    assert!(content.ends_with(".png"));

    // Bytes landed on disk under the images dir
    let relative = content.strip_prefix("images/").unwrap();
    let stored = tmp.path().join("entry-images").join(relative);
    assert_eq!(std::fs::read(stored).unwrap(), pixels);

    // The stored file is served back under /images
    let response = app
        .oneshot(list_request(None, &format!("/{content}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Listing Tests
// =============================================================================

#[tokio::test]
async fn test_listing_without_session_serves_samples() {
    let (app, _tmp) = setup_app(true).await;

    let response = app.oneshot(list_request(None, "/api/entries")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = extract_json(response.into_body()).await;
    assert_eq!(json["source"], "sample");
    assert!(json["total_entries"].as_u64().unwrap() > 0);
    assert_eq!(json["types"][0], "all");
}

#[tokio::test]
async fn test_listing_empty_database_falls_back_to_samples() {
    let (app, _tmp) = setup_app(true).await;
    let cookie = unlock(&app).await;

    let response = app
        .oneshot(list_request(Some(&cookie), "/api/entries"))
        .await
        .unwrap();
    let json = extract_json(response.into_body()).await;
    assert_eq!(json["source"], "sample");
}

#[tokio::test]
async fn test_listing_filters_by_query_and_facet() {
    let (app, _tmp) = setup_app(true).await;
    let cookie = unlock(&app).await;

    for (entry_type, content) in [
        ("text", "remember the milk"),
        ("link", "https://example.com/docs"),
        ("text", "water the plants"),
    ] {
        let body = multipart_body(&[("type", entry_type), ("content", content)], None);
        let response = app
            .clone()
            .oneshot(capture_request(Some(&cookie), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Facet narrows to links
    let response = app
        .clone()
        .oneshot(list_request(Some(&cookie), "/api/entries?type=link"))
        .await
        .unwrap();
    let json = extract_json(response.into_body()).await;
    assert_eq!(json["total_entries"], 1);
    assert_eq!(json["groups"][0]["entries"][0]["type"], "link");

    // Query is case-insensitive over content
    let response = app
        .clone()
        .oneshot(list_request(Some(&cookie), "/api/entries?q=MILK"))
        .await
        .unwrap();
    let json = extract_json(response.into_body()).await;
    assert_eq!(json["total_entries"], 1);

    // Facet list reflects present types, "all" first
    let response = app
        .oneshot(list_request(Some(&cookie), "/api/entries"))
        .await
        .unwrap();
    let json = extract_json(response.into_body()).await;
    let types: Vec<&str> = json["types"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(types[0], "all");
    assert!(types.contains(&"text"));
    assert!(types.contains(&"link"));
}

#[tokio::test]
async fn test_listing_today_view_keeps_most_recent_bucket_only() {
    let (app, _tmp) = setup_app(true).await;
    let cookie = unlock(&app).await;

    let body = multipart_body(&[("type", "text"), ("content", "fresh note")], None);
    let response = app
        .clone()
        .oneshot(capture_request(Some(&cookie), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(list_request(Some(&cookie), "/api/entries?view=today"))
        .await
        .unwrap();
    let json = extract_json(response.into_body()).await;
    assert_eq!(json["view"], "today");
    assert_eq!(json["groups"].as_array().unwrap().len(), 1);
}

// =============================================================================
// UI Serving Tests
// =============================================================================

#[tokio::test]
async fn test_index_and_app_js_served() {
    let (app, _tmp) = setup_app(false).await;

    let response = app.clone().oneshot(list_request(None, "/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(list_request(None, "/static/app.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/javascript"
    );
}

#[tokio::test]
async fn test_unlocked_instance_accepts_capture_without_cookie() {
    // No password configured: access checks are disabled
    let (app, _tmp) = setup_app(false).await;

    let body = multipart_body(&[("type", "text"), ("content", "open capture")], None);
    let response = app.oneshot(capture_request(None, body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
