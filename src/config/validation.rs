use crate::config::types::CrawlConfig;
use crate::ConfigError;
use std::time::Duration;

/// Longest accepted per-page timeout (one day)
pub const MAX_PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Validates the entire configuration
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_start_url(config)?;
    validate_pager_selector(&config.pager_selector)?;
    validate_timeout(config.page_load_timeout)?;
    validate_settle("scroll settle", config.scroll_settle)?;
    validate_settle("navigation settle", config.navigation_settle)?;
    validate_user_agent(config.user_agent.as_deref())?;
    Ok(())
}

/// The seed must be an absolute http(s) URL with a host
fn validate_start_url(config: &CrawlConfig) -> Result<(), ConfigError> {
    let url = &config.start_url;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "START_URL must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidUrl(format!(
            "START_URL '{}' has no host",
            url
        )));
    }

    Ok(())
}

fn validate_pager_selector(selector: &str) -> Result<(), ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::Validation(
            "pager selector cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_timeout(timeout: Duration) -> Result<(), ConfigError> {
    if timeout < Duration::from_secs(1) {
        return Err(ConfigError::Validation(format!(
            "PAGE_LOAD_TIMEOUT must be >= 1 second, got {}s",
            timeout.as_secs()
        )));
    }
    if timeout > MAX_PAGE_LOAD_TIMEOUT {
        return Err(ConfigError::Validation(format!(
            "PAGE_LOAD_TIMEOUT must be <= {} seconds, got {}s",
            MAX_PAGE_LOAD_TIMEOUT.as_secs(),
            timeout.as_secs()
        )));
    }
    Ok(())
}

fn validate_settle(name: &str, pause: Duration) -> Result<(), ConfigError> {
    if pause > MAX_PAGE_LOAD_TIMEOUT {
        return Err(ConfigError::Validation(format!(
            "{} must be <= {} seconds, got {}ms",
            name,
            MAX_PAGE_LOAD_TIMEOUT.as_secs(),
            pause.as_millis()
        )));
    }
    Ok(())
}

/// Header values cannot carry control characters
fn validate_user_agent(user_agent: Option<&str>) -> Result<(), ConfigError> {
    if let Some(ua) = user_agent {
        if ua.chars().any(|c| c.is_control()) {
            return Err(ConfigError::Validation(
                "USER_AGENT cannot contain control characters".to_string(),
            ));
        }
    }
    Ok(())
}
