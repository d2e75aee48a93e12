//! Candidate link extraction for the fallback walk

use crate::renderer::{PageElement, PageRenderer};
use crate::url::{is_non_navigable, UrlClassifier};
use crate::RenderResult;
use std::collections::HashSet;
use url::Url;

/// Selector for anchors with a target
pub const ANCHOR_SELECTOR: &str = "a[href]";

/// Returns the in-scope links of the current page in document order
///
/// Skips anchors that point back at the page itself (`#section`), download
/// anchors and pseudo-scheme links. Duplicates keep their first position.
pub async fn candidate_links(
    renderer: &mut dyn PageRenderer,
    page_url: &Url,
    classifier: &UrlClassifier,
) -> Vec<Url> {
    let elements = match renderer.find_all(ANCHOR_SELECTOR).await {
        Ok(elements) => elements,
        Err(e) => {
            tracing::debug!("Link query failed: {}", e);
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for element in &elements {
        match link_target(element.as_ref()).await {
            Ok(Some(href)) => {
                let Some(url) = classifier.in_scope_url(&href) else {
                    continue;
                };
                if is_same_document(&url, page_url) {
                    continue;
                }
                if seen.insert(url.clone()) {
                    links.push(url);
                }
            }
            Ok(None) => {}
            Err(e) => tracing::debug!("Error extracting link: {}", e),
        }
    }

    links
}

async fn link_target(element: &dyn PageElement) -> RenderResult<Option<String>> {
    if element.attribute("download").await?.is_some() {
        return Ok(None);
    }
    Ok(element
        .attribute("href")
        .await?
        .filter(|href| !href.trim().is_empty() && !is_non_navigable(href)))
}

fn is_same_document(url: &Url, page_url: &Url) -> bool {
    let mut a = url.clone();
    let mut b = page_url.clone();
    a.set_fragment(None);
    b.set_fragment(None);
    a == b
}
