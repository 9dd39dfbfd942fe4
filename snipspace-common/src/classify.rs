//! Content-type inference for pasted or typed drafts
//!
//! Pure and total: every input maps to exactly one [`EntryType`], with
//! `Text` as the catch-all. Classification order is significant: the URL
//! check runs before the code-fence check, which runs before the length
//! check, so a long URL is still a link and never `Mixed`.

use crate::model::EntryType;

/// Length above which plain text is treated as mixed long-form content.
pub const DEFAULT_LONG_TEXT_THRESHOLD: usize = 280;

/// Hosts whose links classify as `Video` rather than plain `Link`.
pub const DEFAULT_VIDEO_HOSTS: &[&str] =
    &["youtube.com", "youtu.be", "vimeo.com", "bilibili.com"];

/// Tunable classifier constants.
///
/// The threshold and host list shifted between iterations of the product,
/// so both are configuration rather than invariants.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub long_text_threshold: usize,
    pub video_hosts: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            long_text_threshold: DEFAULT_LONG_TEXT_THRESHOLD,
            video_hosts: DEFAULT_VIDEO_HOSTS.iter().map(|h| h.to_string()).collect(),
        }
    }
}

impl ClassifierConfig {
    /// Map raw draft text to a content type.
    pub fn classify(&self, content: &str) -> EntryType {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return EntryType::Text;
        }

        if is_http_url(trimmed) {
            let lowered = trimmed.to_lowercase();
            let is_video = self
                .video_hosts
                .iter()
                .any(|host| lowered.contains(&host.to_lowercase()));
            return if is_video {
                EntryType::Video
            } else {
                EntryType::Link
            };
        }

        if has_code_fence(trimmed) {
            return EntryType::Snippet;
        }

        if trimmed.chars().count() > self.long_text_threshold {
            return EntryType::Mixed;
        }

        EntryType::Text
    }
}

/// Classify with the default constants.
pub fn classify(content: &str) -> EntryType {
    ClassifierConfig::default().classify(content)
}

/// True when the (already trimmed) text starts with an HTTP(S) URL:
/// a case-insensitive scheme followed by at least one non-whitespace char.
pub fn is_http_url(trimmed: &str) -> bool {
    for prefix in ["http://", "https://"] {
        let Some(head) = trimmed.get(..prefix.len()) else {
            continue;
        };
        let rest = &trimmed[prefix.len()..];
        if head.eq_ignore_ascii_case(prefix)
            && !rest.is_empty()
            && !rest.starts_with(char::is_whitespace)
        {
            return true;
        }
    }
    false
}

/// True when the text contains a fenced code block: a pair of triple backticks.
fn has_code_fence(text: &str) -> bool {
    match text.find("```") {
        Some(start) => text[start + 3..].contains("```"),
        None => false,
    }
}
