use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Pager selector used when none is configured
pub const DEFAULT_PAGER_SELECTOR: &str = ".next-page";

/// Page cap used when none is configured
pub const DEFAULT_MAX_PAGES: u32 = 10;

/// Per-page load timeout used when none is configured, in seconds
pub const DEFAULT_PAGE_LOAD_TIMEOUT_SECS: u64 = 30;

/// Directory that receives one timestamped folder per run
pub const DEFAULT_OUTPUT_DIR: &str = "RESULT";

/// Pause after scrolling a pager control into view, in milliseconds
pub const DEFAULT_SCROLL_SETTLE_MS: u64 = 1000;

/// Pause after a pager click has landed on a new page, in milliseconds
pub const DEFAULT_NAVIGATION_SETTLE_MS: u64 = 2000;

/// Fully resolved, validated run configuration
///
/// Built once at startup and only read afterwards.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Seed URL; also defines the site scope
    pub start_url: Url,

    /// Site-specific selector for the "next page" control
    pub pager_selector: String,

    /// Maximum number of pages to visit (0 = unbounded)
    pub max_pages: u32,

    /// Upper bound for every wait on a single page
    pub page_load_timeout: Duration,

    /// Optional User-Agent override
    pub user_agent: Option<String>,

    /// Parent directory for per-run output folders
    pub output_dir: PathBuf,

    /// Which page renderer to launch
    pub engine: RendererKind,

    /// Pause after scrolling a pager control into view
    pub scroll_settle: Duration,

    /// Pause after a pager click has landed on a new page
    pub navigation_settle: Duration,
}

impl CrawlConfig {
    /// Creates a configuration for `start_url` with every other field at its default
    pub fn with_defaults(start_url: Url) -> Self {
        Self {
            start_url,
            pager_selector: DEFAULT_PAGER_SELECTOR.to_string(),
            max_pages: DEFAULT_MAX_PAGES,
            page_load_timeout: Duration::from_secs(DEFAULT_PAGE_LOAD_TIMEOUT_SECS),
            user_agent: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            engine: RendererKind::Static,
            scroll_settle: Duration::from_millis(DEFAULT_SCROLL_SETTLE_MS),
            navigation_settle: Duration::from_millis(DEFAULT_NAVIGATION_SETTLE_MS),
        }
    }

    /// Returns true when the crawl has no page cap
    pub fn is_unbounded(&self) -> bool {
        self.max_pages == 0
    }
}

/// Page renderer engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Plain HTTP fetch plus static HTML snapshot
    #[default]
    Static,
    /// Headless Chromium (requires the `chromium` feature)
    Chromium,
}

impl FromStr for RendererKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" | "http" => Ok(Self::Static),
            "chromium" | "chrome" => Ok(Self::Chromium),
            other => Err(format!("unknown renderer '{}'", other)),
        }
    }
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Chromium => write!(f, "chromium"),
        }
    }
}

/// Optional TOML configuration file
///
/// Every key is optional; environment variables and CLI flags take
/// precedence over values read from here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub start_url: Option<String>,
    pub pager_selector: Option<String>,
    pub max_pages: Option<u32>,
    /// Seconds
    pub page_load_timeout: Option<u64>,
    pub user_agent: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub engine: Option<RendererKind>,
    pub scroll_settle_ms: Option<u64>,
    pub navigation_settle_ms: Option<u64>,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub start_url: Option<String>,
    pub max_pages: Option<u32>,
    pub output_dir: Option<PathBuf>,
    pub engine: Option<RendererKind>,
}
