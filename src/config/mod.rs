//! Configuration module for Gallery-Sweep
//!
//! This module reads run parameters from the environment (optionally seeded
//! from a `.env` file), an optional TOML file and command-line overrides,
//! then validates them into a [`CrawlConfig`].
//!
//! # Example
//!
//! ```no_run
//! use gallery_sweep::config::{load_config, ConfigOverrides};
//!
//! let config = load_config(None, &ConfigOverrides::default()).unwrap();
//! println!("Crawler will visit at most {} pages", config.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ConfigOverrides, CrawlConfig, FileConfig, RendererKind, DEFAULT_MAX_PAGES,
    DEFAULT_PAGER_SELECTOR, DEFAULT_PAGE_LOAD_TIMEOUT_SECS,
};

// Re-export parser functions
pub use parser::{
    load_config, load_from_lookup, read_file_config, ENV_MAX_PAGES, ENV_OUTPUT_DIR,
    ENV_PAGER_SELECTOR, ENV_PAGE_LOAD_TIMEOUT, ENV_RENDERER, ENV_START_URL, ENV_USER_AGENT,
};
pub use validation::{validate, MAX_PAGE_LOAD_TIMEOUT};
