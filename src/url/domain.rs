use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (`data:`, `mailto:` and friends), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use gallery_sweep::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("mailto:someone@example.com").unwrap();
/// assert_eq!(extract_domain(&url), None);
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if both URLs point at exactly the same host and port
///
/// Subdomains are distinct hosts: `cdn.example.com` does not match
/// `example.com`. Ports are compared after applying the scheme default, so
/// `http://example.com:80/` and `http://example.com/` are the same host.
pub fn same_host(candidate: &Url, seed: &Url) -> bool {
    match (extract_domain(candidate), extract_domain(seed)) {
        (Some(a), Some(b)) => {
            a == b && candidate.port_or_known_default() == seed.port_or_known_default()
        }
        _ => false,
    }
}
