//! HTTP-backed page renderer
//!
//! Loads pages with `reqwest` and answers element queries from a static
//! snapshot of the returned HTML. No JavaScript runs, so this suits sites
//! whose gallery markup and pager links are present in the server response.

use crate::config::CrawlConfig;
use crate::renderer::document::{select_elements, ElementSnapshot};
use crate::renderer::fetcher::{build_fallback_client, build_http_client, fetch_page};
use crate::renderer::{PageElement, PageRenderer, DEFAULT_USER_AGENT};
use crate::{RenderError, RenderResult};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

/// What the session is currently showing
#[derive(Debug)]
struct Session {
    /// URL of the current page; `None` before the first load
    url: Option<Url>,

    /// HTML of the current page (empty after a failed load)
    html: String,

    /// Bumped on every navigation so older element handles go stale
    generation: u64,

    closed: bool,
}

/// State shared between the renderer and the element handles it hands out
#[derive(Debug)]
struct Shared {
    client: Client,
    timeout: Duration,
    session: Mutex<Session>,
}

impl Shared {
    /// Navigates the session to `url`
    ///
    /// Whatever the outcome, the session moves to a new generation. A failed
    /// load leaves an empty document at `url`.
    async fn navigate(&self, url: &Url) -> RenderResult<()> {
        if self.session.lock().await.closed {
            return Err(RenderError::Closed);
        }

        let fetched = fetch_page(&self.client, url, self.timeout).await;

        let mut session = self.session.lock().await;
        session.generation += 1;
        match fetched {
            Ok(page) => {
                tracing::debug!(
                    "Loaded {} (HTTP {}, {} bytes)",
                    page.final_url,
                    page.status_code,
                    page.body.len()
                );
                session.url = Some(page.final_url);
                session.html = page.body;
                Ok(())
            }
            Err(e) => {
                session.url = Some(url.clone());
                session.html = String::new();
                Err(e)
            }
        }
    }

    /// Fails if the session has moved on since `generation`
    async fn ensure_current(&self, generation: u64) -> RenderResult<()> {
        let session = self.session.lock().await;
        if session.closed {
            return Err(RenderError::Closed);
        }
        if session.generation != generation {
            return Err(RenderError::StaleElement);
        }
        Ok(())
    }
}

/// Page renderer that fetches HTML over HTTP
///
/// # Example
///
/// ```no_run
/// use gallery_sweep::renderer::{PageRenderer, StaticRenderer};
/// use std::time::Duration;
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut renderer = StaticRenderer::new(None, Duration::from_secs(30))?;
/// renderer.load(&Url::parse("https://example.com/")?).await?;
/// let images = renderer.find_all("img").await?;
/// println!("{} images", images.len());
/// renderer.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct StaticRenderer {
    shared: Arc<Shared>,
}

impl StaticRenderer {
    /// Creates a renderer with the primary HTTP client
    pub fn new(user_agent: Option<&str>, timeout: Duration) -> RenderResult<Self> {
        let user_agent = user_agent.unwrap_or(DEFAULT_USER_AGENT);
        let client = build_http_client(user_agent, timeout)
            .map_err(|e| RenderError::Init(format!("HTTP client: {}", e)))?;
        Ok(Self::with_client(client, timeout))
    }

    /// Creates a renderer around an existing client
    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                client,
                timeout,
                session: Mutex::new(Session {
                    url: None,
                    html: String::new(),
                    generation: 0,
                    closed: false,
                }),
            }),
        }
    }

    /// Builds the renderer for a run, trying the fallback client if the
    /// primary one cannot be constructed
    pub fn launch(config: &CrawlConfig) -> RenderResult<Self> {
        let user_agent = config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        let timeout = config.page_load_timeout;

        match build_http_client(user_agent, timeout) {
            Ok(client) => {
                tracing::info!("Static renderer initialized successfully");
                Ok(Self::with_client(client, timeout))
            }
            Err(primary) => {
                tracing::warn!("Primary HTTP client failed ({}), trying plain client", primary);
                match build_fallback_client(user_agent, timeout) {
                    Ok(client) => {
                        tracing::info!("Static renderer initialized with plain client");
                        Ok(Self::with_client(client, timeout))
                    }
                    Err(fallback) => Err(RenderError::Init(format!(
                        "primary client: {}; plain client: {}",
                        primary, fallback
                    ))),
                }
            }
        }
    }
}

#[async_trait]
impl PageRenderer for StaticRenderer {
    async fn load(&mut self, url: &Url) -> RenderResult<()> {
        self.shared.navigate(url).await
    }

    async fn wait_until_ready(&mut self, timeout: Duration) -> RenderResult<()> {
        // The whole body is in hand once `load` returns
        let session = self.shared.session.lock().await;
        if session.closed {
            return Err(RenderError::Closed);
        }
        match &session.url {
            Some(_) => Ok(()),
            None => Err(RenderError::Timeout {
                url: "about:blank".to_string(),
                after: timeout,
            }),
        }
    }

    async fn find_all(&mut self, selector: &str) -> RenderResult<Vec<Box<dyn PageElement>>> {
        let (snapshots, generation) = {
            let session = self.shared.session.lock().await;
            if session.closed {
                return Err(RenderError::Closed);
            }
            let Some(url) = &session.url else {
                return Ok(Vec::new());
            };
            (
                select_elements(&session.html, url, selector)?,
                session.generation,
            )
        };

        Ok(snapshots
            .into_iter()
            .map(|snapshot| {
                Box::new(StaticElement {
                    snapshot,
                    generation,
                    shared: Arc::clone(&self.shared),
                }) as Box<dyn PageElement>
            })
            .collect())
    }

    async fn execute_script(&mut self, script: &str) -> RenderResult<serde_json::Value> {
        let session = self.shared.session.lock().await;
        if session.closed {
            return Err(RenderError::Closed);
        }

        let script = script.trim().trim_end_matches(';');
        let script = script.strip_prefix("return ").unwrap_or(script).trim();
        match script {
            "document.readyState" => {
                let state = if session.url.is_some() {
                    "complete"
                } else {
                    "loading"
                };
                Ok(serde_json::Value::String(state.to_string()))
            }
            "window.location.href" | "document.URL" => Ok(serde_json::Value::String(
                session
                    .url
                    .as_ref()
                    .map_or_else(|| "about:blank".to_string(), Url::to_string),
            )),
            // Nothing to scroll in a static snapshot
            other if other.contains("scrollIntoView") || other.starts_with("window.scroll") => {
                Ok(serde_json::Value::Null)
            }
            other => Err(RenderError::Script(format!(
                "static renderer cannot run '{}'",
                other
            ))),
        }
    }

    async fn current_url(&mut self) -> RenderResult<String> {
        let session = self.shared.session.lock().await;
        if session.closed {
            return Err(RenderError::Closed);
        }
        Ok(session
            .url
            .as_ref()
            .map_or_else(|| "about:blank".to_string(), Url::to_string))
    }

    async fn close(&mut self) -> RenderResult<()> {
        let mut session = self.shared.session.lock().await;
        session.closed = true;
        session.html.clear();
        tracing::debug!("Static renderer closed");
        Ok(())
    }
}

/// Dropping the renderer closes the session, so handles it gave out stop
/// working even when `close` was never reached
impl Drop for StaticRenderer {
    fn drop(&mut self) {
        if let Ok(mut session) = self.shared.session.try_lock() {
            if !session.closed {
                session.closed = true;
                session.html.clear();
                tracing::debug!("Static renderer released on drop");
            }
        }
    }
}

/// Element handle from a [`StaticRenderer`] page
#[derive(Debug)]
pub struct StaticElement {
    snapshot: ElementSnapshot,
    generation: u64,
    shared: Arc<Shared>,
}

#[async_trait]
impl PageElement for StaticElement {
    async fn attribute(&self, name: &str) -> RenderResult<Option<String>> {
        self.shared.ensure_current(self.generation).await?;
        Ok(self.snapshot.attr(name).map(str::to_string))
    }

    async fn is_visible(&self) -> RenderResult<bool> {
        self.shared.ensure_current(self.generation).await?;
        Ok(self.snapshot.visible)
    }

    async fn is_enabled(&self) -> RenderResult<bool> {
        self.shared.ensure_current(self.generation).await?;
        Ok(self.snapshot.enabled)
    }

    async fn scroll_into_view(&self) -> RenderResult<()> {
        self.shared.ensure_current(self.generation).await
    }

    /// Follows the element's `href`, which is all a click can do without scripts
    async fn activate(&self) -> RenderResult<()> {
        self.shared.ensure_current(self.generation).await?;

        let href = self
            .snapshot
            .attr("href")
            .filter(|h| !h.is_empty())
            .ok_or_else(|| RenderError::Navigation {
                url: self.describe(),
                message: "element has no navigable href".to_string(),
            })?;

        let target = Url::parse(href).map_err(|e| RenderError::Navigation {
            url: href.to_string(),
            message: e.to_string(),
        })?;

        if !matches!(target.scheme(), "http" | "https") {
            return Err(RenderError::Navigation {
                url: href.to_string(),
                message: "cannot follow non-http link without a script engine".to_string(),
            });
        }

        self.shared.navigate(&target).await
    }

    fn describe(&self) -> String {
        let mut description = format!("<{}", self.snapshot.tag);
        for key in ["id", "class", "rel", "href"] {
            if let Some(value) = self.snapshot.attr(key) {
                description.push_str(&format!(" {}=\"{}\"", key, value));
            }
        }
        description.push('>');
        description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> StaticRenderer {
        StaticRenderer::new(Some("TestBot/1.0"), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_blank_session() {
        let mut r = renderer();
        assert_eq!(r.current_url().await.unwrap(), "about:blank");
        assert!(r.find_all("img").await.unwrap().is_empty());
        assert!(r.wait_until_ready(Duration::from_millis(10)).await.is_err());
    }

    #[tokio::test]
    async fn test_ready_state_script() {
        let mut r = renderer();
        let state = r
            .execute_script("return document.readyState")
            .await
            .unwrap();
        assert_eq!(state, serde_json::Value::String("loading".to_string()));
    }

    #[tokio::test]
    async fn test_unsupported_script() {
        let mut r = renderer();
        let result = r.execute_script("document.body.innerHTML = ''").await;
        assert!(matches!(result, Err(RenderError::Script(_))));
    }

    #[tokio::test]
    async fn test_scroll_script_is_noop() {
        let mut r = renderer();
        let result = r.execute_script("window.scrollTo(0, document.body.scrollHeight)").await;
        assert_eq!(result.unwrap(), serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_closed_session_rejects_calls() {
        let mut r = renderer();
        r.close().await.unwrap();
        assert!(matches!(r.current_url().await, Err(RenderError::Closed)));
        assert!(matches!(r.find_all("a").await, Err(RenderError::Closed)));
        let url = Url::parse("http://127.0.0.1:9/").unwrap();
        assert!(matches!(r.load(&url).await, Err(RenderError::Closed)));
    }

    #[tokio::test]
    async fn test_drop_closes_session() {
        let r = renderer();
        let shared = Arc::clone(&r.shared);
        drop(r);
        assert!(shared.session.lock().await.closed);
    }

    #[tokio::test]
    async fn test_failed_load_leaves_empty_page_at_url() {
        let mut r = StaticRenderer::new(None, Duration::from_secs(2)).unwrap();
        let url = Url::parse("http://127.0.0.1:9/gallery").unwrap();
        assert!(r.load(&url).await.is_err());
        assert_eq!(r.current_url().await.unwrap(), "http://127.0.0.1:9/gallery");
        assert!(r.find_all("img").await.unwrap().is_empty());
        assert!(r.wait_until_ready(Duration::from_secs(1)).await.is_ok());
    }

    // Loading real pages, element activation and staleness are exercised
    // against wiremock in the integration tests.
}
