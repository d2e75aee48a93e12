//! Headless Chromium renderer (cargo feature `chromium`)

use crate::config::CrawlConfig;
use crate::renderer::{deadline_after, PageElement, PageRenderer};
use crate::{RenderError, RenderResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

/// Flags passed to every browser launch
const BROWSER_ARGS: &[&str] = &[
    "--disable-gpu",
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-extensions",
    "--disable-software-rasterizer",
    "--log-level=3",
    "--silent",
];

const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

const BLANK_PAGE: &str = "about:blank";

/// Bound on resetting the tab after a failed load
const BLANK_PAGE_TIMEOUT: Duration = Duration::from_secs(5);

const VISIBLE_JS: &str = r#"function() {
    if (!this.isConnected) return false;
    const style = window.getComputedStyle(this);
    if (style.display === 'none' || style.visibility === 'hidden') return false;
    const rect = this.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
}"#;

const ENABLED_JS: &str = r#"function() {
    return !this.disabled && this.getAttribute('aria-disabled') !== 'true';
}"#;

/// Page renderer backed by a headless Chromium tab
pub struct ChromiumRenderer {
    browser: Option<Browser>,
    page: Page,
    handler: JoinHandle<()>,
    timeout: Duration,
}

impl ChromiumRenderer {
    /// Launches the browser, falling back to a default configuration if the
    /// tuned one fails to start
    pub async fn launch(config: &CrawlConfig) -> RenderResult<Self> {
        let user_agent = config.user_agent.as_deref();

        let primary = match primary_config(user_agent, config.page_load_timeout) {
            Ok(browser_config) => Browser::launch(browser_config)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e),
        };

        let (browser, mut handler) = match primary {
            Ok(pair) => pair,
            Err(primary_err) => {
                tracing::warn!(
                    "Chromium launch failed ({}), retrying with default options",
                    primary_err
                );
                let fallback = fallback_config(user_agent).map_err(|e| {
                    RenderError::Init(format!("primary: {}; fallback: {}", primary_err, e))
                })?;
                Browser::launch(fallback).await.map_err(|e| {
                    RenderError::Init(format!("primary: {}; fallback: {}", primary_err, e))
                })?
            }
        };

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(RenderError::Init(format!("failed to open tab: {}", e)));
            }
        };

        tracing::info!("Chromium renderer initialized successfully");

        Ok(Self {
            browser: Some(browser),
            page,
            handler,
            timeout: config.page_load_timeout,
        })
    }

    fn ensure_open(&self) -> RenderResult<()> {
        if self.browser.is_none() {
            return Err(RenderError::Closed);
        }
        Ok(())
    }

    /// Leaves the tab on an empty document after a failed load
    ///
    /// If even that does not work the tab is replaced, so queries never see
    /// the page that was showing before.
    async fn blank_page(&mut self) {
        let blanked = tokio::time::timeout(BLANK_PAGE_TIMEOUT, self.page.goto(BLANK_PAGE)).await;
        if matches!(blanked, Ok(Ok(_))) {
            return;
        }
        let Some(browser) = self.browser.as_ref() else {
            return;
        };
        match browser.new_page(BLANK_PAGE).await {
            Ok(page) => {
                let stuck = std::mem::replace(&mut self.page, page);
                if let Err(e) = stuck.close().await {
                    tracing::debug!("Failed to close stuck tab: {}", e);
                }
            }
            Err(e) => tracing::warn!("Could not reset tab after failed load: {}", e),
        }
    }

    async fn ready_state(&self) -> RenderResult<String> {
        let result = self
            .page
            .evaluate("document.readyState")
            .await
            .map_err(script_error)?;
        Ok(result
            .value()
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }
}

fn primary_config(user_agent: Option<&str>, timeout: Duration) -> Result<BrowserConfig, String> {
    let mut builder = BrowserConfig::builder()
        .new_headless_mode()
        .request_timeout(timeout)
        .args(BROWSER_ARGS.iter().copied());
    if let Some(agent) = user_agent {
        builder = builder.arg(format!("--user-agent={}", agent));
    }
    builder.build()
}

fn fallback_config(user_agent: Option<&str>) -> Result<BrowserConfig, String> {
    let mut builder = BrowserConfig::builder();
    if let Some(agent) = user_agent {
        builder = builder.arg(format!("--user-agent={}", agent));
    }
    builder.build()
}

fn script_error(e: CdpError) -> RenderError {
    RenderError::Script(e.to_string())
}

/// Element errors that mean the node left the document
fn element_error(e: CdpError) -> RenderError {
    let message = e.to_string();
    if message.contains("No node") || message.contains("not attached") {
        RenderError::StaleElement
    } else {
        RenderError::Script(message)
    }
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    async fn load(&mut self, url: &Url) -> RenderResult<()> {
        self.ensure_open()?;
        let result = match tokio::time::timeout(self.timeout, self.page.goto(url.as_str())).await {
            Ok(Ok(_)) => return Ok(()),
            Ok(Err(e)) => Err(RenderError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(RenderError::Timeout {
                url: url.to_string(),
                after: self.timeout,
            }),
        };
        self.blank_page().await;
        result
    }

    async fn wait_until_ready(&mut self, timeout: Duration) -> RenderResult<()> {
        self.ensure_open()?;
        let deadline = deadline_after(timeout);
        loop {
            if self.ready_state().await? == "complete" {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(RenderError::Timeout {
                    url: self.current_url().await?,
                    after: timeout,
                });
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }

    async fn find_all(&mut self, selector: &str) -> RenderResult<Vec<Box<dyn PageElement>>> {
        self.ensure_open()?;
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(|e| RenderError::Query {
                selector: selector.to_string(),
                message: e.to_string(),
            })?;
        Ok(elements
            .into_iter()
            .map(|element| Box::new(ChromiumElement { element }) as Box<dyn PageElement>)
            .collect())
    }

    async fn execute_script(&mut self, script: &str) -> RenderResult<serde_json::Value> {
        self.ensure_open()?;
        let result = self.page.evaluate(script).await.map_err(script_error)?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn current_url(&mut self) -> RenderResult<String> {
        self.ensure_open()?;
        let url = self.page.url().await.map_err(script_error)?;
        Ok(url.unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn close(&mut self) -> RenderResult<()> {
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };
        if let Err(e) = browser.close().await {
            tracing::warn!("Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = browser.wait().await {
            tracing::warn!("Failed to wait for browser exit: {}", e);
        }
        self.handler.abort();
        tracing::debug!("Chromium renderer closed");
        Ok(())
    }
}

/// `Browser` kills its child process when dropped; the event loop task has
/// to be stopped here
impl Drop for ChromiumRenderer {
    fn drop(&mut self) {
        if self.browser.is_some() {
            tracing::warn!("Chromium renderer dropped without close, killing the browser");
        }
        self.handler.abort();
    }
}

/// Element handle backed by a DOM node in the live tab
pub struct ChromiumElement {
    element: Element,
}

impl ChromiumElement {
    async fn call_bool(&self, function: &str) -> RenderResult<bool> {
        let returns = self
            .element
            .call_js_fn(function, false)
            .await
            .map_err(element_error)?;
        Ok(returns
            .result
            .value
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }
}

#[async_trait]
impl PageElement for ChromiumElement {
    async fn attribute(&self, name: &str) -> RenderResult<Option<String>> {
        // DOM properties give absolute URLs for href/src
        if matches!(name, "href" | "src") {
            let value = self.element.property(name).await.map_err(element_error)?;
            return Ok(value.and_then(|v| v.as_str().map(str::to_string)));
        }
        self.element.attribute(name).await.map_err(element_error)
    }

    async fn is_visible(&self) -> RenderResult<bool> {
        self.call_bool(VISIBLE_JS).await
    }

    async fn is_enabled(&self) -> RenderResult<bool> {
        self.call_bool(ENABLED_JS).await
    }

    async fn scroll_into_view(&self) -> RenderResult<()> {
        self.element
            .scroll_into_view()
            .await
            .map_err(element_error)?;
        Ok(())
    }

    async fn activate(&self) -> RenderResult<()> {
        self.element.click().await.map_err(element_error)?;
        Ok(())
    }
}
