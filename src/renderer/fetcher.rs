//! HTTP fetcher for the static renderer
//!
//! This module handles all HTTP requests the static renderer makes, including:
//! - Building HTTP clients with the configured user agent
//! - GET requests with redirects followed
//! - Error classification into renderer errors

use crate::{RenderError, RenderResult};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed for a single page load
const MAX_REDIRECTS: usize = 10;

/// A successfully fetched HTML page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status_code: u16,
    /// Page body content
    pub body: String,
}

/// Builds the primary HTTP client
///
/// # Arguments
///
/// * `user_agent` - User-Agent header value
/// * `timeout` - Overall request timeout (the per-page load timeout)
///
/// # Example
///
/// ```
/// use gallery_sweep::renderer::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client("gallery-sweep/1.0", Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .use_rustls_tls()
        .gzip(true)
        .brotli(true)
        .build()
}

/// Builds a bare client used when the primary one cannot be constructed
///
/// Keeps only the user agent and timeout, leaving TLS backend and content
/// decoding at reqwest's defaults.
pub fn build_fallback_client(
    user_agent: &str,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
}

/// Fetches a URL and returns its HTML body
///
/// # Error mapping
///
/// | Condition | Error |
/// |-----------|-------|
/// | Request timeout | `RenderError::Timeout` |
/// | Non-2xx status | `RenderError::Navigation` |
/// | Non-HTML Content-Type | `RenderError::Navigation` |
/// | Connection/TLS/redirect failure | `RenderError::Navigation` |
pub async fn fetch_page(client: &Client, url: &Url, timeout: Duration) -> RenderResult<FetchedPage> {
    let response = client.get(url.clone()).send().await.map_err(|e| {
        if e.is_timeout() {
            RenderError::Timeout {
                url: url.to_string(),
                after: timeout,
            }
        } else {
            RenderError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    })?;

    let status = response.status();
    let final_url = response.url().clone();

    if !status.is_success() {
        return Err(RenderError::Navigation {
            url: url.to_string(),
            message: format!("HTTP {}", status.as_u16()),
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    // Servers that omit the header usually still send HTML
    if !content_type.is_empty()
        && !content_type.contains("text/html")
        && !content_type.contains("application/xhtml")
    {
        return Err(RenderError::Navigation {
            url: url.to_string(),
            message: format!("expected HTML, got {}", content_type),
        });
    }

    let body = response.text().await.map_err(|e| {
        if e.is_timeout() {
            RenderError::Timeout {
                url: url.to_string(),
                after: timeout,
            }
        } else {
            RenderError::Http(e)
        }
    })?;

    Ok(FetchedPage {
        final_url,
        status_code: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client("TestCrawler/1.0", Duration::from_secs(30));
        assert!(client.is_ok());
    }

    #[test]
    fn test_build_fallback_client() {
        let client = build_fallback_client("TestCrawler/1.0", Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_unreachable_is_navigation_error() {
        let client = build_http_client("TestCrawler/1.0", Duration::from_secs(2)).unwrap();
        // Port 9 (discard) on localhost is virtually never listening
        let url = Url::parse("http://127.0.0.1:9/").unwrap();
        let result = fetch_page(&client, &url, Duration::from_secs(2)).await;
        assert!(result.is_err());
    }

    // HTTP status, content-type and timeout handling are covered with
    // wiremock in the integration tests.
}
