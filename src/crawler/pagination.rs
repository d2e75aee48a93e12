//! Pagination Strategy
//!
//! Finds the "next page" affordance on the rendered page and moves the
//! session through it. Three tiers are tried strictly in order:
//!
//! 1. the configured pager selector
//! 2. conventional pager markup (`rel="next"`, common class names)
//! 3. a heuristic scan of anchors whose `href` looks like a page link
//!
//! Tiers 1 and 2 click the control; tier 3 navigates directly.

use crate::config::CrawlConfig;
use crate::renderer::{wait_for_url_change, PageElement, PageRenderer};
use crate::url::UrlClassifier;
use crate::{RenderError, RenderResult};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Pager markup recognised on most sites
pub const CONVENTIONAL_PAGER_SELECTOR: &str = "a[rel='next'], .pagination-next, .next, .page-next";

/// Anchors considered by the heuristic scan
const HEURISTIC_LINK_SELECTOR: &str = "a[href*='page'], a[href*='p='], a[href*='/2']";

/// Timing and selector settings for pager navigation
#[derive(Debug, Clone)]
pub struct PaginationSettings {
    /// Site-specific "next page" selector
    pub pager_selector: String,

    /// Bound on every wait for a page to load or the URL to change
    pub timeout: Duration,

    /// Pause between scrolling a control into view and clicking it
    pub scroll_settle: Duration,

    /// Pause after a click has landed on the new page
    pub navigation_settle: Duration,
}

impl PaginationSettings {
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self {
            pager_selector: config.pager_selector.clone(),
            timeout: config.page_load_timeout,
            scroll_settle: config.scroll_settle,
            navigation_settle: config.navigation_settle,
        }
    }
}

/// Pagination tiers in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerTier {
    Configured,
    Conventional,
    Heuristic,
}

impl fmt::Display for PagerTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configured => write!(f, "configured selector"),
            Self::Conventional => write!(f, "conventional selector"),
            Self::Heuristic => write!(f, "heuristic link scan"),
        }
    }
}

/// Detects and follows "next page" controls
#[derive(Debug, Clone)]
pub struct PaginationStrategy {
    settings: PaginationSettings,
}

impl PaginationStrategy {
    pub fn new(settings: PaginationSettings) -> Self {
        Self { settings }
    }

    fn selector_for(&self, tier: PagerTier) -> &str {
        match tier {
            PagerTier::Configured => &self.settings.pager_selector,
            PagerTier::Conventional => CONVENTIONAL_PAGER_SELECTOR,
            PagerTier::Heuristic => HEURISTIC_LINK_SELECTOR,
        }
    }

    /// Returns true if a visible, enabled pager control is on the page
    ///
    /// Query errors count as "no control".
    pub async fn has_next(&self, renderer: &mut dyn PageRenderer) -> bool {
        for tier in [PagerTier::Configured, PagerTier::Conventional] {
            let selector = self.selector_for(tier);
            let controls = match renderer.find_all(selector).await {
                Ok(controls) => controls,
                Err(e) => {
                    tracing::debug!("Pager query '{}' failed: {}", selector, e);
                    continue;
                }
            };
            tracing::debug!("Found {} potential next page buttons ({})", controls.len(), tier);

            for control in &controls {
                match is_usable(control.as_ref()).await {
                    Ok(true) => {
                        tracing::debug!("Found visible and enabled next page button: {}", control.describe());
                        return true;
                    }
                    Ok(false) => {}
                    Err(e) => tracing::debug!("Error checking button: {}", e),
                }
            }
        }
        false
    }

    /// Moves the session to the next page
    ///
    /// Returns the URL the session landed on, or `None` if no tier made
    /// progress. A landing URL outside the site scope counts as no progress.
    pub async fn advance(
        &self,
        renderer: &mut dyn PageRenderer,
        classifier: &UrlClassifier,
    ) -> Option<Url> {
        let current = match renderer.current_url().await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Cannot read current URL: {}", e);
                return None;
            }
        };

        for tier in [PagerTier::Configured, PagerTier::Conventional] {
            if let Some(landed) = self.click_through(tier, renderer, &current).await {
                return self.accept(landed, tier, classifier);
            }
        }

        let landed = self.follow_page_link(renderer, &current, classifier).await?;
        self.accept(landed, PagerTier::Heuristic, classifier)
    }

    fn accept(&self, landed: String, tier: PagerTier, classifier: &UrlClassifier) -> Option<Url> {
        match classifier.in_scope_url(&landed) {
            Some(url) => {
                tracing::debug!("Advanced to {} via {}", url, tier);
                Some(url)
            }
            None => {
                tracing::warn!("Pager led outside the site to {}, ignoring", landed);
                None
            }
        }
    }

    /// Tiers 1 and 2: click the first usable control that leads elsewhere
    async fn click_through(
        &self,
        tier: PagerTier,
        renderer: &mut dyn PageRenderer,
        current: &str,
    ) -> Option<String> {
        let selector = self.selector_for(tier);
        let controls = match renderer.find_all(selector).await {
            Ok(controls) => controls,
            Err(e) => {
                tracing::debug!("Pager query '{}' failed: {}", selector, e);
                return None;
            }
        };

        for control in &controls {
            match self.click_control(control.as_ref(), renderer, current).await {
                Ok(Some(landed)) => return Some(landed),
                Ok(None) => {}
                Err(e) => tracing::debug!("Tried to click button but got error: {}", e),
            }
        }
        None
    }

    async fn click_control(
        &self,
        control: &dyn PageElement,
        renderer: &mut dyn PageRenderer,
        current: &str,
    ) -> RenderResult<Option<String>> {
        if !is_usable(control).await? {
            return Ok(None);
        }
        let target = match control.attribute("href").await? {
            Some(href) if !href.is_empty() && href != current => href,
            _ => return Ok(None),
        };

        control.scroll_into_view().await?;
        tokio::time::sleep(self.settings.scroll_settle).await;

        tracing::debug!("Clicking {} towards {}", control.describe(), target);
        control.activate().await?;

        renderer.wait_until_ready(self.settings.timeout).await?;
        let landed = wait_for_url_change(renderer, current, self.settings.timeout).await?;

        tokio::time::sleep(self.settings.navigation_settle).await;
        Ok(Some(landed))
    }

    /// Tier 3: navigate straight to the first anchor that looks like a page link
    async fn follow_page_link(
        &self,
        renderer: &mut dyn PageRenderer,
        current: &str,
        classifier: &UrlClassifier,
    ) -> Option<String> {
        let anchors = match renderer.find_all(self.selector_for(PagerTier::Heuristic)).await {
            Ok(anchors) => anchors,
            Err(e) => {
                tracing::debug!("Page link query failed: {}", e);
                return None;
            }
        };

        // Read every href first; the handles go stale once the session moves
        let mut targets = Vec::new();
        for anchor in &anchors {
            match anchor.attribute("href").await {
                Ok(Some(href)) if href != current && looks_like_page_link(&href) => {
                    if classifier.is_in_scope(&href) {
                        targets.push(href);
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::debug!("Error reading page link: {}", e),
            }
        }

        for href in targets {
            match self.navigate(renderer, &href, classifier).await {
                Ok(landed) => return Some(landed),
                Err(e) => tracing::debug!("Tried to follow link but got error: {}", e),
            }
        }
        None
    }

    async fn navigate(
        &self,
        renderer: &mut dyn PageRenderer,
        href: &str,
        classifier: &UrlClassifier,
    ) -> RenderResult<String> {
        let url = classifier.in_scope_url(href).ok_or_else(|| RenderError::Navigation {
            url: href.to_string(),
            message: "not a navigable in-scope URL".to_string(),
        })?;
        renderer.load(&url).await?;
        renderer.wait_until_ready(self.settings.timeout).await?;
        renderer.current_url().await
    }
}

async fn is_usable(control: &dyn PageElement) -> RenderResult<bool> {
    Ok(control.is_visible().await? && control.is_enabled().await?)
}

/// Whether an href textually suggests a pagination target
///
/// Matches `page`, `p=`, or a path segment made only of digits (`/2`).
pub fn looks_like_page_link(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    if lower.contains("page") || lower.contains("p=") {
        return true;
    }
    match Url::parse(href) {
        Ok(url) => url
            .path_segments()
            .map(|mut segments| {
                segments.any(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
            })
            .unwrap_or(false),
        Err(_) => false,
    }
}
