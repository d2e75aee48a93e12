//! URL handling module for Gallery-Sweep
//!
//! This module is the URL Classifier: it turns relative references into
//! absolute URLs and decides which URLs belong to the site being crawled.
//! Nothing here performs I/O and nothing here fails loudly; malformed input
//! is simply out of scope.

mod domain;
mod normalize;
mod scope;

// Re-export main functions
pub use domain::{extract_domain, same_host};
pub use normalize::{resolve, to_absolute};
pub use scope::{is_in_scope, is_non_navigable};

use url::Url;

/// Scope checks bound to a single seed URL
///
/// The crawler builds one of these at startup and consults it for every
/// candidate link and image it sees.
#[derive(Debug, Clone)]
pub struct UrlClassifier {
    seed: Url,
}

impl UrlClassifier {
    /// Creates a classifier for the given seed URL
    pub fn new(seed: Url) -> Self {
        Self { seed }
    }

    /// The seed URL every check is relative to
    pub fn seed(&self) -> &Url {
        &self.seed
    }

    /// See [`is_in_scope`]
    pub fn is_in_scope(&self, url: &str) -> bool {
        is_in_scope(url, &self.seed)
    }

    /// Resolves `url` and returns it only if it is in scope
    ///
    /// This is the single gate every URL passes through before it may enter
    /// the visited set, the image set, or the crawl cursor.
    pub fn in_scope_url(&self, url: &str) -> Option<Url> {
        if !self.is_in_scope(url) {
            return None;
        }
        resolve(url, &self.seed)
    }
}
