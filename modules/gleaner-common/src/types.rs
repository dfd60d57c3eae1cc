use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How many leading characters of the text body participate in the
/// deduplication key. Posts sharing a handle and this prefix are treated as
/// the same post even when their other fields differ.
pub const KEY_TEXT_PREFIX_CHARS: usize = 50;

/// One harvested post from the source view.
///
/// Immutable once produced by sampling — the collector never rewrites a
/// post it has already accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub handle: String,
    pub text: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub url: Option<String>,
}

impl Post {
    /// Build a post from extracted fields, sanitizing the text body.
    pub fn new(handle: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            text: sanitize_text(&text.into()),
            timestamp: None,
            url: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Deduplication key: handle plus the first [`KEY_TEXT_PREFIX_CHARS`]
    /// characters of the text body. Timestamp and URL never participate.
    pub fn dedup_key(&self) -> String {
        let prefix_end = self
            .text
            .char_indices()
            .nth(KEY_TEXT_PREFIX_CHARS)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len());
        format!("{}_{}", self.handle, &self.text[..prefix_end])
    }
}

/// Strip ASCII control characters from extracted text, keeping newlines,
/// tabs, and carriage returns, then trim surrounding whitespace.
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_ascii_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sanitize_strips_controls_but_keeps_newlines_and_tabs() {
        let cleaned = sanitize_text("Hello\x00World\x1fThis\nIs\tFine");
        assert_eq!(cleaned, "HelloWorldThis\nIs\tFine");
    }

    #[test]
    fn sanitize_trims_and_handles_empty() {
        assert_eq!(sanitize_text("  padded  "), "padded");
        assert_eq!(sanitize_text(""), "");
        assert_eq!(sanitize_text("\x7f\x01"), "");
    }

    #[test]
    fn dedup_key_uses_handle_and_text_prefix() {
        let post = Post::new("@user1", "short text");
        assert_eq!(post.dedup_key(), "@user1_short text");
    }

    #[test]
    fn dedup_key_truncates_long_text_at_fifty_chars() {
        let long = "a".repeat(80);
        let post = Post::new("@user1", long);
        assert_eq!(post.dedup_key(), format!("@user1_{}", "a".repeat(50)));
    }

    #[test]
    fn dedup_key_counts_characters_not_bytes() {
        // 60 snowmen: 3 bytes each, key keeps the first 50 characters whole
        let text = "☃".repeat(60);
        let post = Post::new("@snow", text);
        assert_eq!(post.dedup_key(), format!("@snow_{}", "☃".repeat(50)));
    }

    #[test]
    fn dedup_key_ignores_timestamp_and_url() {
        let base = Post::new("@user1", "same body");
        let decorated = Post::new("@user1", "same body")
            .with_timestamp(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap())
            .with_url("https://example.com/status/1");
        assert_eq!(base.dedup_key(), decorated.dedup_key());
    }
}
