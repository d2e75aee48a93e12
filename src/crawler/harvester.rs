//! Image Harvester

use crate::renderer::{PageElement, PageRenderer};
use crate::url::UrlClassifier;
use crate::RenderResult;
use std::collections::BTreeSet;
use url::Url;

/// Selector for image-bearing elements
pub const IMAGE_SELECTOR: &str = "img";

/// Primary source attribute
const SRC_ATTRIBUTE: &str = "src";

/// Lazy-load source attribute, read when `src` is absent or empty
const LAZY_SRC_ATTRIBUTE: &str = "data-src";

/// Collects the in-scope image URLs of the page the renderer is showing
///
/// Never fails: a failed query yields an empty set, and an element whose
/// attributes cannot be read is skipped.
pub async fn harvest(renderer: &mut dyn PageRenderer, classifier: &UrlClassifier) -> BTreeSet<Url> {
    let elements = match renderer.find_all(IMAGE_SELECTOR).await {
        Ok(elements) => elements,
        Err(e) => {
            tracing::debug!("Image query failed: {}", e);
            return BTreeSet::new();
        }
    };

    let mut images = BTreeSet::new();
    for element in &elements {
        match image_source(element.as_ref()).await {
            Ok(Some(source)) => {
                if let Some(url) = classifier.in_scope_url(&source) {
                    images.insert(url);
                } else {
                    tracing::trace!("Skipping out-of-scope image {}", source);
                }
            }
            Ok(None) => {}
            Err(e) => tracing::debug!("Error extracting image URL: {}", e),
        }
    }

    images
}

async fn image_source(element: &dyn PageElement) -> RenderResult<Option<String>> {
    let primary = non_empty(element.attribute(SRC_ATTRIBUTE).await?);
    if primary.is_some() {
        return Ok(primary);
    }
    Ok(non_empty(element.attribute(LAZY_SRC_ATTRIBUTE).await?))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
