//! Twitter data types.

use serde::{Deserialize, Serialize};

/// Maximum number of characters kept from extracted tweet text.
pub const MAX_TEXT_CHARS: usize = 500;

/// Best-effort content pulled from a tweet page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedContent {
    /// Tweet text content, truncated to [`MAX_TEXT_CHARS`]. May be empty.
    pub text: String,
    /// Author handle (without @), derived from the URL. May be empty.
    pub username: String,
}

impl FetchedContent {
    /// Create content, truncating text to the stored limit.
    #[must_use]
    pub fn new(text: &str, username: String) -> Self {
        Self {
            text: truncate_chars(text, MAX_TEXT_CHARS),
            username,
        }
    }

    /// The empty fallback used when a fetch fails.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Text length in characters, the signal the reply generator uses.
    #[must_use]
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Truncate to at most `max` characters, respecting UTF-8 boundaries.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Extract the author handle from a status URL.
///
/// Takes the path segment right before the literal `status` segment and
/// strips a leading `@`. Returns an empty string when there is no such segment.
///
/// - `https://x.com/alice/status/123` -> `alice`
/// - `https://x.com/@alice/status/123` -> `alice`
/// - `https://x.com/home` -> ``
#[must_use]
pub fn username_from_url(url: &str) -> String {
    let parts: Vec<&str> = url.split('/').collect();
    parts
        .iter()
        .position(|part| *part == "status")
        .filter(|&idx| idx > 0)
        .map(|idx| parts[idx - 1].trim_start_matches('@').to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_from_status_url() {
        assert_eq!(username_from_url("https://x.com/alice/status/123"), "alice");
        assert_eq!(
            username_from_url("https://twitter.com/bob_dev/status/99?s=20"),
            "bob_dev"
        );
    }

    #[test]
    fn test_username_strips_leading_at() {
        assert_eq!(username_from_url("https://x.com/@carol/status/1"), "carol");
    }

    #[test]
    fn test_username_without_status_segment() {
        assert_eq!(username_from_url("https://x.com/alice"), "");
        assert_eq!(username_from_url("not a url"), "");
        // `statuses` is not the literal segment
        assert_eq!(username_from_url("https://x.com/alice/statuses/1"), "");
    }

    #[test]
    fn test_username_status_at_start() {
        assert_eq!(username_from_url("status/123"), "");
    }

    #[test]
    fn test_username_uses_first_status_segment() {
        assert_eq!(
            username_from_url("https://x.com/alice/status/1/bob/status/2"),
            "alice"
        );
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        let text = "🚀".repeat(600);
        let truncated = truncate_chars(&text, MAX_TEXT_CHARS);
        assert_eq!(truncated.chars().count(), 500);

        assert_eq!(truncate_chars("short", 500), "short");
    }

    #[test]
    fn test_fetched_content_truncates() {
        let long = "a".repeat(800);
        let content = FetchedContent::new(&long, "alice".to_string());
        assert_eq!(content.text_len(), MAX_TEXT_CHARS);
        assert_eq!(content.username, "alice");
    }
}
