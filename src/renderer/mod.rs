//! Page renderer abstraction
//!
//! The crawler never talks to a browser or an HTTP client directly. It
//! depends on the [`PageRenderer`] and [`PageElement`] traits defined here,
//! which any engine can implement:
//!
//! - [`StaticRenderer`]: fetches pages over HTTP and queries a static HTML
//!   snapshot (default, no browser needed)
//! - `ChromiumRenderer`: drives headless Chromium (cargo feature `chromium`)
//!
//! Element handles are snapshots of a single page load. Once the session
//! navigates elsewhere, handles taken from the previous page report
//! [`RenderError::StaleElement`].

#[cfg(feature = "chromium")]
mod chromium;
mod document;
mod fetcher;
mod static_page;

#[cfg(feature = "chromium")]
pub use chromium::ChromiumRenderer;
pub use document::{select_elements, ElementSnapshot};
pub use fetcher::{build_fallback_client, build_http_client, fetch_page, FetchedPage};
pub use static_page::{StaticElement, StaticRenderer};

use crate::config::{CrawlConfig, RendererKind, MAX_PAGE_LOAD_TIMEOUT};
use crate::{RenderError, RenderResult};
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// User agent sent when no override is configured
pub const DEFAULT_USER_AGENT: &str = concat!("gallery-sweep/", env!("CARGO_PKG_VERSION"));

/// A handle to one element of the currently rendered page
#[async_trait]
pub trait PageElement: Send + Sync {
    /// Reads an attribute; `href` and `src` come back as absolute URLs
    async fn attribute(&self, name: &str) -> RenderResult<Option<String>>;

    /// Whether the element is displayed
    async fn is_visible(&self) -> RenderResult<bool>;

    /// Whether the element accepts interaction
    async fn is_enabled(&self) -> RenderResult<bool>;

    /// Scrolls the element into the viewport
    async fn scroll_into_view(&self) -> RenderResult<()>;

    /// Clicks the element
    async fn activate(&self) -> RenderResult<()>;

    /// Short description for log lines
    fn describe(&self) -> String {
        "<element>".to_string()
    }
}

/// A single rendering session (one tab) owned by the crawler
#[async_trait]
pub trait PageRenderer: Send {
    /// Navigates the session to `url`
    ///
    /// On failure the session is left on an empty page, so follow-up queries
    /// see no elements rather than the previous page.
    async fn load(&mut self, url: &Url) -> RenderResult<()>;

    /// Waits until the document reports it has finished loading
    async fn wait_until_ready(&mut self, timeout: Duration) -> RenderResult<()>;

    /// Returns every element matching a CSS selector, in document order
    async fn find_all(&mut self, selector: &str) -> RenderResult<Vec<Box<dyn PageElement>>>;

    /// Runs a script in the page and returns its JSON result
    async fn execute_script(&mut self, script: &str) -> RenderResult<serde_json::Value>;

    /// URL of the page currently shown
    async fn current_url(&mut self) -> RenderResult<String>;

    /// Releases the session; further calls return [`RenderError::Closed`]
    async fn close(&mut self) -> RenderResult<()>;
}

/// Instant `timeout` from now, capped when the sum would overflow
pub(crate) fn deadline_after(timeout: Duration) -> tokio::time::Instant {
    let now = tokio::time::Instant::now();
    now.checked_add(timeout)
        .or_else(|| now.checked_add(MAX_PAGE_LOAD_TIMEOUT))
        .unwrap_or(now)
}

/// Polls the session until its URL differs from `previous`
///
/// Returns the new URL, or [`RenderError::Timeout`] once `timeout` elapses.
pub async fn wait_for_url_change(
    renderer: &mut dyn PageRenderer,
    previous: &str,
    timeout: Duration,
) -> RenderResult<String> {
    const POLL_INTERVAL: Duration = Duration::from_millis(100);

    let deadline = deadline_after(timeout);
    loop {
        let current = renderer.current_url().await?;
        if current != previous {
            return Ok(current);
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(RenderError::Timeout {
                url: previous.to_string(),
                after: timeout,
            });
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Launches the renderer selected in the configuration
///
/// Each engine has a primary and one alternate initialization path; if both
/// fail the returned [`RenderError::Init`] names both causes.
pub async fn launch(config: &CrawlConfig) -> RenderResult<Box<dyn PageRenderer>> {
    match config.engine {
        RendererKind::Static => {
            let renderer = StaticRenderer::launch(config)?;
            Ok(Box::new(renderer))
        }
        RendererKind::Chromium => launch_chromium(config).await,
    }
}

#[cfg(feature = "chromium")]
async fn launch_chromium(config: &CrawlConfig) -> RenderResult<Box<dyn PageRenderer>> {
    let renderer = ChromiumRenderer::launch(config).await?;
    Ok(Box::new(renderer))
}

#[cfg(not(feature = "chromium"))]
async fn launch_chromium(_config: &CrawlConfig) -> RenderResult<Box<dyn PageRenderer>> {
    Err(RenderError::Init(
        "this build has no Chromium support; rebuild with `--features chromium` or use the static renderer"
            .to_string(),
    ))
}
