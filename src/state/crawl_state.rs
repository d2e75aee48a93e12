use std::collections::{BTreeSet, HashSet};
use url::Url;

/// Accumulated state of one traversal
///
/// Holds the Visited Set, the Image Set and the Crawl Cursor. All three only
/// ever grow or move forward; nothing is removed during a run.
#[derive(Debug, Clone)]
pub struct CrawlState {
    /// Visited URLs in visit order
    visited: Vec<Url>,

    /// Membership index over `visited`
    visited_index: HashSet<Url>,

    /// Every image found so far, ordered by serialized URL
    images: BTreeSet<Url>,

    /// URL the next step will load; `None` once the walk has nowhere to go
    cursor: Option<Url>,

    /// Number of times the cursor has advanced
    page_count: u32,
}

impl CrawlState {
    /// Creates state with the cursor on `seed`
    pub fn new(seed: Url) -> Self {
        Self {
            visited: Vec::new(),
            visited_index: HashSet::new(),
            images: BTreeSet::new(),
            cursor: Some(seed),
            page_count: 0,
        }
    }

    /// URL the next step will load
    pub fn current(&self) -> Option<&Url> {
        self.cursor.as_ref()
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited_index.contains(url)
    }

    /// Records a visit; returns false if `url` was already visited
    pub fn mark_visited(&mut self, url: Url) -> bool {
        if !self.visited_index.insert(url.clone()) {
            return false;
        }
        self.visited.push(url);
        true
    }

    /// Records another address of an already visited page
    ///
    /// Used when a load is redirected: the landing URL counts as visited
    /// without adding a second page to the visit order. Returns false if it
    /// was already known.
    pub fn mark_alias(&mut self, url: Url) -> bool {
        self.visited_index.insert(url)
    }

    /// Unions a page's harvest into the Image Set
    ///
    /// Returns how many of the URLs were new.
    pub fn merge_images<I>(&mut self, images: I) -> usize
    where
        I: IntoIterator<Item = Url>,
    {
        let before = self.images.len();
        self.images.extend(images);
        self.images.len() - before
    }

    /// Moves the cursor to `next` and counts the step
    pub fn advance(&mut self, next: Url) {
        self.cursor = Some(next);
        self.page_count += 1;
    }

    /// Clears the cursor
    pub fn clear_cursor(&mut self) {
        self.cursor = None;
    }

    /// Visited URLs in visit order
    pub fn visited(&self) -> &[Url] {
        &self.visited
    }

    pub fn images(&self) -> &BTreeSet<Url> {
        &self.images
    }

    /// Image URLs sorted lexicographically
    pub fn sorted_images(&self) -> Vec<Url> {
        self.images.iter().cloned().collect()
    }
}
