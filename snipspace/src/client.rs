//! HTTP implementation of the entry creation boundary
//!
//! Used by the `snipspace-capture` CLI to drive the capture flow against a
//! running dashboard. The reqwest client is expected to carry the session
//! cookie (cookie store enabled, unlocked via `POST /api/session`).

use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use snipspace_common::capture::{BoundaryError, CapturePayload, EntryBoundary};
use snipspace_common::model::Entry;

/// Entry creation boundary speaking multipart HTTP.
pub struct HttpEntryBoundary {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    entry: Entry,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

impl HttpEntryBoundary {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl EntryBoundary for HttpEntryBoundary {
    async fn create_entry(&self, payload: CapturePayload) -> Result<Entry, BoundaryError> {
        let mut form = Form::new()
            .text("type", payload.entry_type.as_str())
            .text("content", payload.content);
        if let Some(title) = payload.title {
            form = form.text("title", title);
        }
        if let Some(source_url) = payload.source_url {
            form = form.text("sourceUrl", source_url);
        }
        if let Some(image) = payload.image {
            let part = Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.mime_type)
                .map_err(|e| BoundaryError::Transport(e.to_string()))?;
            form = form.part("image", part);
        }

        let response = self
            .client
            .post(format!("{}/api/entries", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| BoundaryError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let body: CreateResponse = response
                .json()
                .await
                .map_err(|e| BoundaryError::Transport(e.to_string()))?;
            Ok(body.entry)
        } else {
            let message = response
                .json::<ErrorResponse>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_default();
            Err(BoundaryError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}
