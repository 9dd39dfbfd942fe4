//! Capture submission flow
//!
//! A single in-progress draft and its lifecycle: `Idle` while editable,
//! `Submitting` while the one outstanding request is in flight, then back
//! to `Idle` with either a cleared draft (success) or a preserved draft
//! plus a surfaced message (failure). The persistence side is abstracted
//! behind [`EntryBoundary`] so the flow can run against the live HTTP
//! boundary or a test double.

use thiserror::Error;
use tracing::debug;

use crate::classify::{is_http_url, ClassifierConfig};
use crate::model::{Entry, EntryType};

/// Upload ceiling for attached images (10 MiB). Enforced client-side before
/// any request is made and again at the persistence boundary.
pub const IMAGE_LIMIT: usize = 10 * 1024 * 1024;

/// Server-side truncation limit for titles, in characters.
pub const TITLE_LIMIT: usize = 200;

/// Validation message for a draft with neither text nor image.
pub const EMPTY_DRAFT_MESSAGE: &str = "Provide text content or an image";

/// Validation message for an attachment over [`IMAGE_LIMIT`].
pub const IMAGE_TOO_LARGE_MESSAGE: &str = "Image exceeds the 10 MiB limit";

/// Fallback surfaced when the boundary fails without a usable message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Request failed, check your connection";

/// An image attached to a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftImage {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// The in-progress, not-yet-persisted entry being composed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Draft {
    pub text: String,
    pub title: Option<String>,
    pub entry_type: EntryType,
    pub image: Option<DraftImage>,
}

/// Flow states. Only one request may be outstanding per draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Submitting,
}

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Entry persisted; the draft was reset and the caller should refresh
    /// its entry listing.
    Saved(Entry),
    /// Client-side validation failed; no request was made.
    Rejected(String),
    /// The boundary refused the submission or the transport failed; the
    /// draft is preserved for a manual retry.
    Failed(String),
    /// A submission is already in flight.
    Busy,
}

/// Failure reported by the persistence boundary.
#[derive(Debug, Clone, Error)]
pub enum BoundaryError {
    /// Non-2xx response with the server's human-readable message.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// Network or connection failure before a response arrived.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Multipart payload submitted to the entry creation boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturePayload {
    pub entry_type: EntryType,
    pub content: String,
    pub title: Option<String>,
    pub source_url: Option<String>,
    pub image: Option<DraftImage>,
}

/// The entry creation boundary as seen by the capture flow.
pub trait EntryBoundary {
    fn create_entry(
        &self,
        payload: CapturePayload,
    ) -> impl std::future::Future<Output = Result<Entry, BoundaryError>> + Send;
}

/// State machine driving a single draft through submission.
#[derive(Debug, Default)]
pub struct CaptureFlow {
    draft: Draft,
    state: CaptureState,
    last_error: Option<String>,
    classifier: ClassifierConfig,
}

impl CaptureFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flow with non-default classifier constants.
    pub fn with_classifier(classifier: ClassifierConfig) -> Self {
        Self {
            classifier,
            ..Self::default()
        }
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Last inline validation or submission message, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Replace the draft text. Re-runs the classifier unless an attached
    /// image pins the type to `Image`.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.draft.text = text.into();
        if self.draft.image.is_none() {
            self.draft.entry_type = self.classifier.classify(&self.draft.text);
        }
    }

    /// Set or clear the optional title. Empty input means "no title".
    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        self.draft.title = if title.is_empty() { None } else { Some(title) };
    }

    /// Attach an image, forcing the type to `Image` and bypassing the
    /// classifier. Oversized attachments are refused with an inline message
    /// and leave the draft unchanged.
    pub fn attach_image(&mut self, image: DraftImage) -> Result<(), String> {
        if image.bytes.len() > IMAGE_LIMIT {
            self.last_error = Some(IMAGE_TOO_LARGE_MESSAGE.to_string());
            return Err(IMAGE_TOO_LARGE_MESSAGE.to_string());
        }
        self.draft.image = Some(image);
        self.draft.entry_type = EntryType::Image;
        self.last_error = None;
        Ok(())
    }

    /// Remove the attached image, reverting the type to `Text`.
    pub fn remove_image(&mut self) {
        self.draft.image = None;
        self.draft.entry_type = EntryType::Text;
    }

    /// Build the multipart payload for the current draft. The source URL is
    /// included only for link/video drafts whose trimmed text reads as an
    /// HTTP(S) URL, mirroring the content.
    pub fn build_payload(&self) -> CapturePayload {
        let trimmed = self.draft.text.trim();
        let source_url = match self.draft.entry_type {
            EntryType::Link | EntryType::Video if is_http_url(trimmed) => {
                Some(trimmed.to_string())
            }
            _ => None,
        };

        CapturePayload {
            entry_type: self.draft.entry_type,
            content: self.draft.text.clone(),
            title: self.draft.title.clone(),
            source_url,
            image: self.draft.image.clone(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.draft.text.is_empty() && self.draft.image.is_none() {
            return Err(EMPTY_DRAFT_MESSAGE.to_string());
        }
        if let Some(image) = &self.draft.image {
            if image.bytes.len() > IMAGE_LIMIT {
                return Err(IMAGE_TOO_LARGE_MESSAGE.to_string());
            }
        }
        Ok(())
    }

    /// Submit the draft through the boundary.
    ///
    /// Preconditions are checked before any request is made; a violation
    /// surfaces inline as `Rejected` with no network traffic. No retry and
    /// no cancellation: every failure is terminal for the attempt.
    pub async fn submit<B: EntryBoundary>(&mut self, boundary: &B) -> SubmitOutcome {
        if self.state == CaptureState::Submitting {
            return SubmitOutcome::Busy;
        }

        if let Err(message) = self.validate() {
            self.last_error = Some(message.clone());
            return SubmitOutcome::Rejected(message);
        }

        self.state = CaptureState::Submitting;
        self.last_error = None;

        let result = boundary.create_entry(self.build_payload()).await;
        self.state = CaptureState::Idle;

        match result {
            Ok(entry) => {
                debug!(entry_id = %entry.id, "Entry persisted, resetting draft");
                self.draft = Draft::default();
                SubmitOutcome::Saved(entry)
            }
            Err(error) => {
                let message = match error {
                    BoundaryError::Rejected { message, .. } if !message.is_empty() => message,
                    _ => GENERIC_FAILURE_MESSAGE.to_string(),
                };
                self.last_error = Some(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }
}

/// Boundary-side source URL inference: an explicit non-empty value wins;
/// otherwise URL-shaped content is mirrored for link/video entries.
pub fn infer_source_url(
    entry_type: EntryType,
    content: &str,
    provided: Option<&str>,
) -> Option<String> {
    if matches!(entry_type, EntryType::Link | EntryType::Video) {
        if let Some(value) = provided {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
        let trimmed = content.trim();
        if is_http_url(trimmed) {
            return Some(trimmed.to_string());
        }
        return None;
    }
    provided
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Boundary double: counts calls and returns a canned response.
    struct MockBoundary {
        response: Result<Entry, BoundaryError>,
        calls: AtomicUsize,
    }

    impl MockBoundary {
        fn succeeding() -> Self {
            Self {
                response: Ok(saved_entry()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(status: u16, message: &str) -> Self {
            Self {
                response: Err(BoundaryError::Rejected {
                    status,
                    message: message.to_string(),
                }),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl EntryBoundary for MockBoundary {
        async fn create_entry(&self, _payload: CapturePayload) -> Result<Entry, BoundaryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone()
        }
    }

    fn saved_entry() -> Entry {
        Entry {
            id: "e-1".to_string(),
            title: None,
            content: "hello".to_string(),
            entry_type: EntryType::Text,
            source_url: None,
            created_at: "2024-01-02T10:00:00Z".to_string(),
            tags: Some(Vec::new()),
        }
    }

    fn image(bytes: usize) -> DraftImage {
        DraftImage {
            file_name: "shot.png".to_string(),
            mime_type: "image/png".to_string(),
            bytes: vec![0u8; bytes],
        }
    }

    #[test]
    fn test_text_changes_rerun_classifier() {
        let mut flow = CaptureFlow::new();
        flow.set_text("https://youtu.be/abc");
        assert_eq!(flow.draft().entry_type, EntryType::Video);
        flow.set_text("plain note");
        assert_eq!(flow.draft().entry_type, EntryType::Text);
    }

    #[test]
    fn test_attached_image_pins_type_until_removed() {
        let mut flow = CaptureFlow::new();
        flow.attach_image(image(128)).unwrap();
        assert_eq!(flow.draft().entry_type, EntryType::Image);

        // Classifier is bypassed while an image is attached
        flow.set_text("https://example.com");
        assert_eq!(flow.draft().entry_type, EntryType::Image);

        flow.remove_image();
        assert_eq!(flow.draft().entry_type, EntryType::Text);
    }

    #[test]
    fn test_image_limit_boundary_exact() {
        let mut flow = CaptureFlow::new();
        // Exactly 10 MiB is accepted
        assert!(flow.attach_image(image(IMAGE_LIMIT)).is_ok());
        // One byte over is refused and the previous attachment stays
        let err = flow.attach_image(image(IMAGE_LIMIT + 1)).unwrap_err();
        assert_eq!(err, IMAGE_TOO_LARGE_MESSAGE);
        assert_eq!(flow.draft().image.as_ref().unwrap().bytes.len(), IMAGE_LIMIT);
    }

    #[tokio::test]
    async fn test_empty_draft_is_rejected_without_network() {
        let boundary = MockBoundary::succeeding();
        let mut flow = CaptureFlow::new();

        let outcome = flow.submit(&boundary).await;

        assert_eq!(outcome, SubmitOutcome::Rejected(EMPTY_DRAFT_MESSAGE.to_string()));
        assert_eq!(flow.last_error(), Some(EMPTY_DRAFT_MESSAGE));
        assert_eq!(boundary.call_count(), 0);
    }

    #[tokio::test]
    async fn test_successful_submit_resets_draft() {
        let boundary = MockBoundary::succeeding();
        let mut flow = CaptureFlow::new();
        flow.set_text("a note to keep");
        flow.set_title("keeper");

        let outcome = flow.submit(&boundary).await;

        assert_eq!(outcome, SubmitOutcome::Saved(saved_entry()));
        assert_eq!(flow.draft(), &Draft::default());
        assert_eq!(flow.state(), CaptureState::Idle);
        assert_eq!(flow.last_error(), None);
        assert_eq!(boundary.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_submit_preserves_draft_and_surfaces_message() {
        let boundary = MockBoundary::failing(500, "Duplicate entry");
        let mut flow = CaptureFlow::new();
        flow.set_text("a note to keep");

        let outcome = flow.submit(&boundary).await;

        assert_eq!(outcome, SubmitOutcome::Failed("Duplicate entry".to_string()));
        assert_eq!(flow.draft().text, "a note to keep");
        assert_eq!(flow.state(), CaptureState::Idle);
        assert_eq!(flow.last_error(), Some("Duplicate entry"));
    }

    #[tokio::test]
    async fn test_failure_without_message_uses_generic_fallback() {
        let boundary = MockBoundary::failing(500, "");
        let mut flow = CaptureFlow::new();
        flow.set_text("note");

        let outcome = flow.submit(&boundary).await;

        assert_eq!(outcome, SubmitOutcome::Failed(GENERIC_FAILURE_MESSAGE.to_string()));
    }

    #[tokio::test]
    async fn test_submit_while_in_flight_is_busy() {
        let boundary = MockBoundary::succeeding();
        let mut flow = CaptureFlow::new();
        flow.set_text("note");
        flow.state = CaptureState::Submitting;

        assert_eq!(flow.submit(&boundary).await, SubmitOutcome::Busy);
        assert_eq!(boundary.call_count(), 0);
    }

    #[test]
    fn test_payload_source_url_only_for_url_shaped_link_or_video() {
        let mut flow = CaptureFlow::new();
        flow.set_text("https://example.com/page");
        assert_eq!(
            flow.build_payload().source_url,
            Some("https://example.com/page".to_string())
        );

        flow.set_text("just some text");
        assert_eq!(flow.build_payload().source_url, None);
    }

    #[test]
    fn test_infer_source_url_prefers_explicit_value() {
        assert_eq!(
            infer_source_url(EntryType::Link, "https://a.example", Some("https://b.example")),
            Some("https://b.example".to_string())
        );
        assert_eq!(
            infer_source_url(EntryType::Video, "https://youtu.be/x", None),
            Some("https://youtu.be/x".to_string())
        );
        assert_eq!(infer_source_url(EntryType::Link, "not a url", None), None);
        assert_eq!(infer_source_url(EntryType::Text, "https://a.example", None), None);
    }
}
