//! Ordered selector fallback for locating tweet text.

use std::future::Future;

use crate::error::FetchError;

/// Stable testid X renders around tweet text.
pub const TWEET_TEXT_SELECTOR: &str = r#"[data-testid="tweetText"]"#;

/// Generated class chain from older X markup.
pub const LEGACY_CLASS_SELECTOR: &str =
    ".css-901oao.r-hwyvb4.r-1qd0xha.r-a023e6.r-16dba41.r-ad9z0x.r-bcqeeo.r-qvutc0";

/// Language-tagged text inside the article container.
pub const ARTICLE_LANG_SELECTOR: &str = r#"article[role="article"] div[lang]"#;

/// Selectors tried in order until one yields text.
#[derive(Debug, Clone)]
pub struct SelectorCascade {
    selectors: Vec<String>,
}

impl Default for SelectorCascade {
    fn default() -> Self {
        Self::new(
            [
                TWEET_TEXT_SELECTOR,
                LEGACY_CLASS_SELECTOR,
                ARTICLE_LANG_SELECTOR,
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
        )
    }
}

impl SelectorCascade {
    /// Create a cascade from an ordered selector list.
    #[must_use]
    pub fn new(selectors: Vec<String>) -> Self {
        Self { selectors }
    }

    /// The selectors in evaluation order.
    #[must_use]
    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }

    /// Run `probe` against each selector in order and return the first
    /// non-empty text. Later selectors are not evaluated once one matches.
    ///
    /// A selector whose probe fails is skipped.
    pub async fn first_text<F, Fut>(&self, mut probe: F) -> Option<String>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<Option<String>, FetchError>>,
    {
        for selector in &self.selectors {
            match probe(selector.clone()).await {
                Ok(Some(text)) if !text.trim().is_empty() => {
                    tracing::debug!(selector = %selector, len = text.len(), "Selector matched");
                    return Some(text);
                }
                Ok(_) => {
                    tracing::debug!(selector = %selector, "Selector yielded no text");
                }
                Err(e) => {
                    tracing::debug!(selector = %selector, error = %e, "Selector evaluation failed");
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Answer = Result<Option<String>, FetchError>;

    fn scripted(
        answers: Vec<(&'static str, Answer)>,
    ) -> (SelectorCascade, Arc<Mutex<Vec<String>>>, Arc<Mutex<Vec<Answer>>>) {
        let cascade = SelectorCascade::new(answers.iter().map(|(s, _)| (*s).to_string()).collect());
        let results = answers.into_iter().map(|(_, r)| r).rev().collect();
        (cascade, Arc::new(Mutex::new(Vec::new())), Arc::new(Mutex::new(results)))
    }

    #[tokio::test]
    async fn test_first_match_wins_and_stops() {
        let (cascade, seen, results) = scripted(vec![
            ("a", Ok(None)),
            ("b", Ok(Some("hello".to_string()))),
            ("c", Ok(Some("never".to_string()))),
        ]);

        let text = cascade
            .first_text(|sel| {
                seen.lock().unwrap().push(sel);
                let next = results.lock().unwrap().pop().unwrap();
                async move { next }
            })
            .await;

        assert_eq!(text.as_deref(), Some("hello"));
        assert_eq!(*seen.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_errors_and_blank_text_fall_through() {
        let (cascade, _seen, results) = scripted(vec![
            ("a", Err(FetchError::Browser("boom".to_string()))),
            ("b", Ok(Some("   ".to_string()))),
            ("c", Ok(Some("found".to_string()))),
        ]);

        let text = cascade
            .first_text(|_| {
                let next = results.lock().unwrap().pop().unwrap();
                async move { next }
            })
            .await;

        assert_eq!(text.as_deref(), Some("found"));
    }

    #[tokio::test]
    async fn test_no_match_returns_none() {
        let (cascade, _seen, results) = scripted(vec![("a", Ok(None)), ("b", Ok(None))]);

        let text = cascade
            .first_text(|_| {
                let next = results.lock().unwrap().pop().unwrap();
                async move { next }
            })
            .await;

        assert!(text.is_none());
    }

    #[test]
    fn test_default_order() {
        let cascade = SelectorCascade::default();
        assert_eq!(cascade.selectors()[0], TWEET_TEXT_SELECTOR);
        assert_eq!(cascade.selectors()[2], ARTICLE_LANG_SELECTOR);
    }
}
