//! Static HTML snapshots for the static renderer
//!
//! This module parses an HTML document and answers CSS selector queries with
//! plain-data [`ElementSnapshot`]s, approximating what a browser would report
//! for the same elements:
//! - `href` and `src` are resolved to absolute URLs, like DOM properties
//! - visibility follows `hidden`, `aria-hidden`, hidden inputs, inline
//!   `display:none`/`visibility:hidden`, and placement inside `<head>` or
//!   `<template>`, on the element or any ancestor
//! - a control is disabled by the `disabled` attribute,
//!   `aria-disabled="true"`, or a `disabled` class

use crate::{RenderError, RenderResult};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use url::Url;

/// Attributes that a browser exposes as resolved URLs
const URL_ATTRIBUTES: &[&str] = &["href", "src"];

/// Ancestors whose content is never rendered
const NON_RENDERED_TAGS: &[&str] = &["head", "template"];

/// Everything the static renderer knows about one matched element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSnapshot {
    /// Lowercase tag name
    pub tag: String,

    /// Attribute values; `href` and `src` are absolute when resolvable
    pub attributes: HashMap<String, String>,

    /// Whether a browser would display it
    pub visible: bool,

    /// Whether a browser would let it be interacted with
    pub enabled: bool,
}

impl ElementSnapshot {
    /// Returns an attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Parses `html` and returns snapshots of every element matching `selector`
///
/// # Arguments
///
/// * `html` - The HTML content to query
/// * `base_url` - The page URL, used to resolve relative `href`/`src`
/// * `selector` - A CSS selector (group selectors with `,` are allowed)
///
/// # Returns
///
/// * `Ok(Vec<ElementSnapshot>)` - Matches in document order
/// * `Err(RenderError::Query)` - The selector does not parse
///
/// # Example
///
/// ```
/// use gallery_sweep::renderer::select_elements;
/// use url::Url;
///
/// let html = r#"<html><body><a rel="next" href="/page/2">Next</a></body></html>"#;
/// let base = Url::parse("https://example.com/page/1").unwrap();
/// let found = select_elements(html, &base, "a[rel='next']").unwrap();
/// assert_eq!(found[0].attr("href"), Some("https://example.com/page/2"));
/// ```
pub fn select_elements(
    html: &str,
    base_url: &Url,
    selector: &str,
) -> RenderResult<Vec<ElementSnapshot>> {
    let parsed = Selector::parse(selector).map_err(|e| RenderError::Query {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })?;

    let document = Html::parse_document(html);

    Ok(document
        .select(&parsed)
        .map(|element| snapshot(element, base_url))
        .collect())
}

fn snapshot(element: ElementRef<'_>, base_url: &Url) -> ElementSnapshot {
    let attributes = element
        .value()
        .attrs()
        .map(|(name, value)| {
            let value = if URL_ATTRIBUTES.contains(&name) {
                resolve_property(value, base_url)
            } else {
                value.to_string()
            };
            (name.to_string(), value)
        })
        .collect();

    ElementSnapshot {
        tag: element.value().name().to_ascii_lowercase(),
        attributes,
        visible: is_rendered(element),
        enabled: !is_disabled(element),
    }
}

/// Resolves a URL-valued attribute the way the DOM property getter does
///
/// Values that fail to resolve are kept verbatim.
fn resolve_property(value: &str, base_url: &Url) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match base_url.join(trimmed) {
        Ok(absolute) => absolute.to_string(),
        Err(_) => value.to_string(),
    }
}

fn is_rendered(element: ElementRef<'_>) -> bool {
    if is_hidden(element) {
        return false;
    }

    for ancestor in element.ancestors().filter_map(ElementRef::wrap) {
        if NON_RENDERED_TAGS.contains(&ancestor.value().name()) || is_hidden(ancestor) {
            return false;
        }
    }

    true
}

fn is_hidden(element: ElementRef<'_>) -> bool {
    let value = element.value();

    if value.attr("hidden").is_some() {
        return true;
    }

    if value
        .attr("aria-hidden")
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    {
        return true;
    }

    if value.name() == "input"
        && value
            .attr("type")
            .is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
    {
        return true;
    }

    if let Some(style) = value.attr("style") {
        let compact: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        if compact.contains("display:none") || compact.contains("visibility:hidden") {
            return true;
        }
    }

    false
}

fn is_disabled(element: ElementRef<'_>) -> bool {
    let value = element.value();

    value.attr("disabled").is_some()
        || value
            .attr("aria-disabled")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        || value.classes().any(|c| c.eq_ignore_ascii_case("disabled"))
}
