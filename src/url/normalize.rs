use url::Url;

/// Converts a possibly relative URL into absolute form
///
/// URLs that already carry an `http://` or `https://` scheme are returned
/// exactly as given. Anything else is joined onto `base`. If the join fails
/// the input is returned unchanged, so this never errors and is idempotent:
/// `to_absolute(&to_absolute(u, b), b) == to_absolute(u, b)`.
///
/// # Examples
///
/// ```
/// use gallery_sweep::url::to_absolute;
/// use url::Url;
///
/// let seed = Url::parse("https://example.com/gallery/").unwrap();
/// assert_eq!(to_absolute("img/a.png", &seed), "https://example.com/gallery/img/a.png");
/// assert_eq!(to_absolute("/b.png", &seed), "https://example.com/b.png");
/// assert_eq!(to_absolute("https://example.com/c.png", &seed), "https://example.com/c.png");
/// ```
pub fn to_absolute(url: &str, base: &Url) -> String {
    if has_http_scheme(url.trim_start()) {
        return url.to_string();
    }

    match base.join(url.trim()) {
        Ok(joined) => joined.to_string(),
        Err(e) => {
            tracing::debug!("Could not resolve '{}' against {}: {}", url, base, e);
            url.to_string()
        }
    }
}

/// Resolves a URL against `base` and parses it
///
/// Returns None for anything that does not end up as a parseable URL.
pub fn resolve(url: &str, base: &Url) -> Option<Url> {
    Url::parse(&to_absolute(url, base)).ok()
}

/// Checks for an explicit http(s) scheme, ignoring ASCII case
fn has_http_scheme(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> Url {
        Url::parse("https://example.com/gallery/index.html").unwrap()
    }

    #[test]
    fn test_absolute_url_unchanged() {
        let input = "https://example.com/Some/Path?b=2&a=1#frag";
        assert_eq!(to_absolute(input, &seed()), input);
    }

    #[test]
    fn test_absolute_uppercase_scheme_unchanged() {
        let input = "HTTPS://EXAMPLE.COM/x.png";
        assert_eq!(to_absolute(input, &seed()), input);
    }

    #[test]
    fn test_root_relative() {
        assert_eq!(
            to_absolute("/images/a.png", &seed()),
            "https://example.com/images/a.png"
        );
    }

    #[test]
    fn test_path_relative() {
        assert_eq!(
            to_absolute("thumbs/a.png", &seed()),
            "https://example.com/gallery/thumbs/a.png"
        );
    }

    #[test]
    fn test_parent_relative() {
        assert_eq!(
            to_absolute("../a.png", &seed()),
            "https://example.com/a.png"
        );
    }

    #[test]
    fn test_protocol_relative() {
        assert_eq!(
            to_absolute("//cdn.example.com/a.png", &seed()),
            "https://cdn.example.com/a.png"
        );
    }

    #[test]
    fn test_query_only() {
        assert_eq!(
            to_absolute("?page=2", &seed()),
            "https://example.com/gallery/index.html?page=2"
        );
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "",
            "   ",
            "/a",
            "a/b/../c",
            "?p=3",
            "#top",
            "//other.org/x",
            "https://example.com/x",
            "http://example.com:8080/y",
            "javascript:void(0)",
            "mailto:someone@example.com",
            "ftp://example.com/file",
            "http://[::1",
            "data:image/png;base64,AAAA",
        ];

        for input in inputs {
            let once = to_absolute(input, &seed());
            let twice = to_absolute(&once, &seed());
            assert_eq!(once, twice, "to_absolute not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_malformed_returns_input() {
        let input = "http://[::1";
        assert_eq!(to_absolute(input, &seed()), input);
        assert!(resolve(input, &seed()).is_none());
    }

    #[test]
    fn test_resolve_relative() {
        let resolved = resolve("/p/2", &seed()).unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/p/2");
    }
}
