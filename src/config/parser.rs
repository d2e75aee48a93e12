use crate::config::types::{
    ConfigOverrides, CrawlConfig, FileConfig, RendererKind, DEFAULT_MAX_PAGES,
    DEFAULT_NAVIGATION_SETTLE_MS, DEFAULT_OUTPUT_DIR, DEFAULT_PAGER_SELECTOR,
    DEFAULT_PAGE_LOAD_TIMEOUT_SECS, DEFAULT_SCROLL_SETTLE_MS,
};
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Environment variable names
pub const ENV_START_URL: &str = "START_URL";
pub const ENV_PAGER_SELECTOR: &str = "PAGER_SELECTOR";
pub const ENV_MAX_PAGES: &str = "MAX_PAGES";
pub const ENV_PAGE_LOAD_TIMEOUT: &str = "PAGE_LOAD_TIMEOUT";
pub const ENV_USER_AGENT: &str = "USER_AGENT";
pub const ENV_OUTPUT_DIR: &str = "OUTPUT_DIR";
pub const ENV_RENDERER: &str = "RENDERER";

/// Loads the run configuration
///
/// Sources, from lowest to highest precedence: built-in defaults, the
/// optional TOML file at `path`, a `.env` file in the working directory, the
/// process environment, and finally `overrides` from the command line.
///
/// # Example
///
/// ```no_run
/// use gallery_sweep::config::{load_config, ConfigOverrides};
///
/// let config = load_config(None, &ConfigOverrides::default()).unwrap();
/// println!("Crawling {}", config.start_url);
/// ```
pub fn load_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<CrawlConfig, ConfigError> {
    // A missing .env file is normal
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!("Ignoring unreadable .env file: {}", e);
        }
    }

    let file = match path {
        Some(path) => read_file_config(path)?,
        None => FileConfig::default(),
    };

    load_from_lookup(file, overrides, |key| std::env::var(key).ok())
}

/// Reads and parses a TOML configuration file
pub fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let file: FileConfig = toml::from_str(&content)?;
    Ok(file)
}

/// Builds a configuration from a file layer, CLI overrides and an
/// environment lookup function
///
/// Empty or whitespace-only environment values count as unset.
pub fn load_from_lookup<F>(
    file: FileConfig,
    overrides: &ConfigOverrides,
    lookup: F,
) -> Result<CrawlConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let env = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let start_url_raw = overrides
        .start_url
        .clone()
        .or_else(|| env(ENV_START_URL))
        .or(file.start_url)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingStartUrl)?;
    let start_url = Url::parse(start_url_raw.trim())
        .map_err(|e| ConfigError::InvalidUrl(format!("START_URL '{}': {}", start_url_raw, e)))?;

    let pager_selector = env(ENV_PAGER_SELECTOR)
        .or(file.pager_selector)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_PAGER_SELECTOR.to_string());

    let max_pages = match overrides.max_pages {
        Some(n) => n,
        None => match env(ENV_MAX_PAGES) {
            Some(raw) => parse_number(ENV_MAX_PAGES, &raw)?,
            None => file.max_pages.unwrap_or(DEFAULT_MAX_PAGES),
        },
    };

    let timeout_secs: u64 = match env(ENV_PAGE_LOAD_TIMEOUT) {
        Some(raw) => parse_number(ENV_PAGE_LOAD_TIMEOUT, &raw)?,
        None => file
            .page_load_timeout
            .unwrap_or(DEFAULT_PAGE_LOAD_TIMEOUT_SECS),
    };

    let user_agent = env(ENV_USER_AGENT)
        .or(file.user_agent)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let output_dir = overrides
        .output_dir
        .clone()
        .or_else(|| env(ENV_OUTPUT_DIR).map(PathBuf::from))
        .or(file.output_dir)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

    let engine = match overrides.engine {
        Some(kind) => kind,
        None => match env(ENV_RENDERER) {
            Some(raw) => RendererKind::from_str(&raw).map_err(ConfigError::Validation)?,
            None => file.engine.unwrap_or_default(),
        },
    };

    let config = CrawlConfig {
        start_url,
        pager_selector,
        max_pages,
        page_load_timeout: Duration::from_secs(timeout_secs),
        user_agent,
        output_dir,
        engine,
        scroll_settle: Duration::from_millis(
            file.scroll_settle_ms.unwrap_or(DEFAULT_SCROLL_SETTLE_MS),
        ),
        navigation_settle: Duration::from_millis(
            file.navigation_settle_ms
                .unwrap_or(DEFAULT_NAVIGATION_SETTLE_MS),
        ),
    };

    validate(&config)?;

    Ok(config)
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidNumber {
            key: key.to_string(),
            value: raw.to_string(),
        })
}
