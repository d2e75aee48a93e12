//! Scripted in-memory renderer for crawler unit tests

use crate::renderer::{PageElement, PageRenderer};
use crate::{RenderError, RenderResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// One element on a scripted page
#[derive(Debug, Clone)]
pub struct FakeNode {
    pub attrs: HashMap<String, String>,
    pub visible: bool,
    pub enabled: bool,
    /// Attribute reads fail with this node
    pub broken: bool,
}

impl FakeNode {
    pub fn new(attrs: &[(&str, &str)]) -> Self {
        Self {
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            visible: true,
            enabled: true,
            broken: false,
        }
    }

    pub fn img(src: &str) -> Self {
        Self::new(&[("src", src)])
    }

    pub fn link(href: &str) -> Self {
        Self::new(&[("href", href)])
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }
}

/// A scripted page: what each selector returns
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub by_selector: HashMap<String, Vec<FakeNode>>,
    /// Loading this page fails after leaving an empty document
    pub fails: bool,
    /// Loading this URL lands on another one
    pub redirect_to: Option<String>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, selector: &str, nodes: Vec<FakeNode>) -> Self {
        self.by_selector
            .entry(selector.to_string())
            .or_default()
            .extend(nodes);
        self
    }

    pub fn redirecting_to(target: &str) -> Self {
        Self {
            redirect_to: Some(target.to_string()),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fails: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Default)]
struct FakeSession {
    current: Option<String>,
    generation: u64,
    loads: Vec<String>,
    closed: bool,
}

/// Renderer serving [`FakePage`]s keyed by URL
#[derive(Debug, Clone, Default)]
pub struct FakeRenderer {
    pages: Arc<HashMap<String, FakePage>>,
    session: Arc<Mutex<FakeSession>>,
}

impl FakeRenderer {
    pub fn new(pages: Vec<(&str, FakePage)>) -> Self {
        Self {
            pages: Arc::new(
                pages
                    .into_iter()
                    .map(|(url, page)| (url.to_string(), page))
                    .collect(),
            ),
            session: Arc::default(),
        }
    }

    /// Every URL passed to `load` or reached by activation, in order
    pub fn loads(&self) -> Vec<String> {
        self.session.lock().unwrap().loads.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.session.lock().unwrap().closed
    }

    fn navigate(&self, url: &str) -> RenderResult<()> {
        let mut session = self.session.lock().unwrap();
        if session.closed {
            return Err(RenderError::Closed);
        }
        let page = self.pages.get(url);
        session.current = Some(
            page.and_then(|p| p.redirect_to.clone())
                .unwrap_or_else(|| url.to_string()),
        );
        session.generation += 1;
        session.loads.push(url.to_string());
        match page {
            Some(page) if page.fails => Err(RenderError::Timeout {
                url: url.to_string(),
                after: Duration::from_secs(1),
            }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl PageRenderer for FakeRenderer {
    async fn load(&mut self, url: &Url) -> RenderResult<()> {
        self.navigate(url.as_str())
    }

    async fn wait_until_ready(&mut self, _timeout: Duration) -> RenderResult<()> {
        Ok(())
    }

    async fn find_all(&mut self, selector: &str) -> RenderResult<Vec<Box<dyn PageElement>>> {
        let session = self.session.lock().unwrap();
        if session.closed {
            return Err(RenderError::Closed);
        }
        let Some(current) = &session.current else {
            return Ok(Vec::new());
        };
        let page = match self.pages.get(current) {
            Some(page) if !page.fails => page,
            _ => return Ok(Vec::new()),
        };
        Ok(page
            .by_selector
            .get(selector)
            .map(|nodes| {
                nodes
                    .iter()
                    .cloned()
                    .map(|node| {
                        Box::new(FakeElement {
                            node,
                            generation: session.generation,
                            renderer: self.clone(),
                        }) as Box<dyn PageElement>
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn execute_script(&mut self, _script: &str) -> RenderResult<serde_json::Value> {
        Ok(serde_json::Value::Null)
    }

    async fn current_url(&mut self) -> RenderResult<String> {
        let session = self.session.lock().unwrap();
        Ok(session
            .current
            .clone()
            .unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn close(&mut self) -> RenderResult<()> {
        self.session.lock().unwrap().closed = true;
        Ok(())
    }
}

pub struct FakeElement {
    node: FakeNode,
    generation: u64,
    renderer: FakeRenderer,
}

impl FakeElement {
    fn check(&self) -> RenderResult<()> {
        if self.node.broken {
            return Err(RenderError::Script("broken element".to_string()));
        }
        if self.renderer.session.lock().unwrap().generation != self.generation {
            return Err(RenderError::StaleElement);
        }
        Ok(())
    }
}

#[async_trait]
impl PageElement for FakeElement {
    async fn attribute(&self, name: &str) -> RenderResult<Option<String>> {
        self.check()?;
        Ok(self.node.attrs.get(name).cloned())
    }

    async fn is_visible(&self) -> RenderResult<bool> {
        self.check()?;
        Ok(self.node.visible)
    }

    async fn is_enabled(&self) -> RenderResult<bool> {
        self.check()?;
        Ok(self.node.enabled)
    }

    async fn scroll_into_view(&self) -> RenderResult<()> {
        self.check()
    }

    async fn activate(&self) -> RenderResult<()> {
        self.check()?;
        match self.node.attrs.get("href") {
            Some(href) => self.renderer.navigate(href),
            None => Err(RenderError::Navigation {
                url: String::new(),
                message: "no href".to_string(),
            }),
        }
    }
}
