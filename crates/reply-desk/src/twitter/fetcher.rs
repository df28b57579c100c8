//! Remote tweet fetching over the Chrome DevTools Protocol.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::{browser::BrowserContextId, target::CreateTargetParams};
use chromiumoxide::Page;
use futures::future::BoxFuture;
use futures::{Future, StreamExt};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::config::DeskConfig;
use crate::error::FetchError;

use super::cascade::SelectorCascade;
use super::types::{username_from_url, FetchedContent};

/// How often `document.readyState` is polled while waiting for the DOM.
const DOM_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A source of tweet content for a URL.
///
/// Implementations report why content could not be retrieved; callers decide
/// how to degrade.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Retrieve text and author handle for a tweet URL.
    async fn fetch(&self, url: &str) -> Result<FetchedContent, FetchError>;
}

/// Fetches tweets through an already-running Chromium instance.
///
/// Each call attaches to the browser at `endpoint`, opens one page in the
/// first existing browsing context, and closes that page before returning.
/// The browser itself is left running.
#[derive(Debug, Clone)]
pub struct BrowserFetcher {
    endpoint: String,
    navigation_timeout: Duration,
    load_timeout: Duration,
    cascade: SelectorCascade,
}

impl BrowserFetcher {
    /// Create a fetcher for the given CDP endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, navigation_timeout: Duration, load_timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            navigation_timeout,
            load_timeout,
            cascade: SelectorCascade::default(),
        }
    }

    /// Create a fetcher from desk configuration.
    #[must_use]
    pub fn from_config(config: &DeskConfig) -> Self {
        Self::new(
            config.cdp_endpoint.clone(),
            config.navigation_timeout,
            config.load_timeout,
        )
    }

    /// Replace the selector cascade.
    #[must_use]
    pub fn with_cascade(mut self, cascade: SelectorCascade) -> Self {
        self.cascade = cascade;
        self
    }

    /// Attach to the remote browser and spawn its CDP handler.
    async fn connect(&self) -> Result<(Browser, JoinHandle<()>), FetchError> {
        let connected = timeout(self.navigation_timeout, Browser::connect(self.endpoint.as_str()))
            .await
            .map_err(|_| FetchError::ConnectionFailed {
                endpoint: self.endpoint.clone(),
                reason: format!("timed out after {}s", self.navigation_timeout.as_secs()),
            })?;

        let (browser, mut handler) = connected.map_err(|e| FetchError::ConnectionFailed {
            endpoint: self.endpoint.clone(),
            reason: e.to_string(),
        })?;

        // Spawn handler task
        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok((browser, handle))
    }

    /// Open a blank page in the browser's first existing context.
    async fn open_page(&self, browser: &mut Browser) -> Result<Page, FetchError> {
        let context_id = first_browser_context(browser).await?;

        let params = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context_id)
            .build()
            .map_err(FetchError::Browser)?;
        Ok(browser.new_page(params).await?)
    }

    async fn extract(&self, page: &Page, url: &str) -> Result<FetchedContent, FetchError> {
        tracing::debug!(url, "Navigating to tweet");
        timeout(self.navigation_timeout, page.goto(url))
            .await
            .map_err(|_| FetchError::Timeout {
                stage: "navigation",
                after: self.navigation_timeout,
            })??;

        timeout(self.load_timeout, wait_for_dom_ready(page))
            .await
            .map_err(|_| FetchError::Timeout {
                stage: "DOM ready",
                after: self.load_timeout,
            })??;

        let username = username_from_url(url);
        let text = self
            .cascade
            .first_text(move |selector| async move { first_element_text(page, &selector).await })
            .await;

        match text {
            Some(text) => Ok(FetchedContent::new(&text, username)),
            None => Err(FetchError::NoMatch { username }),
        }
    }
}

#[async_trait]
impl ContentSource for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedContent, FetchError> {
        let (mut browser, handler) = self.connect().await?;

        // Until a page exists, only the handler task needs stopping
        let detach = Release::new(abort_task(&handler));

        let page = match self.open_page(&mut browser).await {
            Ok(page) => page,
            Err(e) => {
                detach.run().await;
                tracing::debug!(url, error = %e, "Fetch produced no content");
                return Err(e);
            }
        };

        // From here the page must be closed on every exit, including this
        // future being dropped by a caller's timeout. The remote browser keeps
        // running; only the connection is dropped.
        let close = Release::new({
            let page = page.clone();
            let abort = abort_task(&handler);
            async move {
                if let Err(e) = page.close().await {
                    tracing::warn!(error = %e, "Failed to close page");
                }
                drop(browser);
                abort.await;
            }
        });
        detach.disarm();

        let result = self.extract(&page, url).await;
        close.run().await;

        match &result {
            Ok(content) => tracing::debug!(
                url,
                username = %content.username,
                len = content.text.len(),
                "Fetched tweet content"
            ),
            Err(e) => tracing::debug!(url, error = %e, "Fetch produced no content"),
        }
        result
    }
}

/// Async cleanup that runs exactly once.
///
/// `run` awaits it in place. If the guard is dropped first (a cancelled
/// future), the cleanup is spawned onto the current runtime instead.
struct Release {
    cleanup: Option<BoxFuture<'static, ()>>,
}

impl Release {
    fn new<F>(cleanup: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            cleanup: Some(Box::pin(cleanup)),
        }
    }

    async fn run(mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup.await;
        }
    }

    fn disarm(mut self) {
        self.cleanup = None;
    }
}

impl Drop for Release {
    fn drop(&mut self) {
        let Some(cleanup) = self.cleanup.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                tracing::debug!("Fetch cancelled - releasing page in background");
                runtime.spawn(cleanup);
            }
            Err(_) => tracing::warn!("No runtime to release browser page on"),
        }
    }
}

/// A future that aborts the CDP handler task.
fn abort_task(handler: &JoinHandle<()>) -> impl Future<Output = ()> + Send + 'static {
    let handle = handler.abort_handle();
    async move { handle.abort() }
}

/// Find the first browsing context among the browser's existing targets.
async fn first_browser_context(browser: &mut Browser) -> Result<BrowserContextId, FetchError> {
    let targets = browser.fetch_targets().await?;
    targets
        .into_iter()
        .find_map(|target| target.browser_context_id)
        .ok_or(FetchError::NoContext)
}

async fn wait_for_dom_ready(page: &Page) -> Result<(), FetchError> {
    loop {
        let state: String = page
            .evaluate("document.readyState")
            .await?
            .into_value()
            .map_err(|e| FetchError::Browser(e.to_string()))?;
        if state == "interactive" || state == "complete" {
            return Ok(());
        }
        tokio::time::sleep(DOM_POLL_INTERVAL).await;
    }
}

async fn first_element_text(page: &Page, selector: &str) -> Result<Option<String>, FetchError> {
    let elements = page.find_elements(selector).await?;
    match elements.first() {
        Some(element) => Ok(element.inner_text().await?),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_endpoint_is_connection_failure() {
        // Port 9 (discard) on loopback is not a CDP endpoint
        let fetcher = BrowserFetcher::new(
            "http://127.0.0.1:9",
            Duration::from_secs(2),
            Duration::from_secs(1),
        );

        let err = fetcher
            .fetch("https://x.com/alice/status/1")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::ConnectionFailed { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_release_runs_when_cancelled() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let work = async move {
            let _close = Release::new(async move {
                let _ = tx.send(());
            });
            // Stands in for a page that never finishes loading
            std::future::pending::<()>().await;
        };

        assert!(timeout(Duration::from_millis(50), work).await.is_err());
        timeout(Duration::from_secs(1), rx).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_release_runs_once() {
        let runs = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = runs.clone();
        let close = Release::new(async move {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });

        close.run().await;
        tokio::task::yield_now().await;
        assert_eq!(runs.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disarmed_release_never_runs() {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        Release::new(async move {
            let _ = tx.send(());
        })
        .disarm();

        // The sender is dropped unsent
        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn test_abort_task_stops_handler() {
        let handler = tokio::spawn(std::future::pending::<()>());
        Release::new(abort_task(&handler)).run().await;
        assert!(handler.await.unwrap_err().is_cancelled());
    }

    #[test]
    fn test_from_config_uses_endpoint() {
        let config = DeskConfig::default();
        let fetcher = BrowserFetcher::from_config(&config);
        assert_eq!(fetcher.endpoint, config.cdp_endpoint);
        assert_eq!(fetcher.navigation_timeout, config.navigation_timeout);
        assert_eq!(fetcher.load_timeout, config.load_timeout);
    }
}
