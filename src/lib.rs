//! Gallery-Sweep: a bounded single-site image crawler
//!
//! This crate walks a paginated, gallery-style site one page at a time,
//! following "next page" controls or same-domain links, collects every
//! in-scope image URL it sees and renders them into a static HTML report.

pub mod config;
pub mod crawler;
pub mod logging;
pub mod output;
pub mod renderer;
pub mod runner;
pub mod state;
pub mod url;

use std::time::Duration;
use thiserror::Error;

/// Main error type for Gallery-Sweep operations
///
/// Only configuration and renderer initialization failures are expected to
/// reach the process boundary. Everything that happens while a page is being
/// rendered is absorbed by the crawler.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Renderer error: {0}")]
    Renderer(#[from] RenderError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No START_URL specified")]
    MissingStartUrl,

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidNumber { key: String, value: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors raised by a page renderer
///
/// Apart from `Init`, these are per-page transient errors: the crawler logs
/// them and treats the affected page or element as empty.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to initialize renderer: {0}")]
    Init(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Timed out after {after:?} waiting for {url}")]
    Timeout { url: String, after: Duration },

    #[error("Element is no longer attached to the page")]
    StaleElement,

    #[error("Script execution failed: {0}")]
    Script(String),

    #[error("Invalid selector '{selector}': {message}")]
    Query { selector: String, message: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Renderer session is closed")]
    Closed,
}

/// Result type alias for Gallery-Sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for renderer operations
pub type RenderResult<T> = std::result::Result<T, RenderError>;

// Re-export commonly used types
pub use config::CrawlConfig;
pub use crawler::{run_crawl, CrawlOutcome, Traversal};
pub use output::RunSummary;
pub use renderer::{PageElement, PageRenderer};
pub use runner::execute_run;
pub use state::{DoneReason, TraversalState};
pub use crate::url::UrlClassifier;
