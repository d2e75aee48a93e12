//! State module for tracking traversal progress
//!
//! # Components
//!
//! - `TraversalState` / `DoneReason`: the `Idle → Active → Done` lifecycle
//! - `CrawlState`: Visited Set, Image Set and Crawl Cursor of one run

mod crawl_state;
mod traversal_state;

pub use crawl_state::CrawlState;
pub use traversal_state::{DoneReason, TraversalState};
