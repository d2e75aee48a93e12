use super::domain::same_host;
use super::normalize::resolve;
use url::Url;

/// Pseudo-schemes that never lead to a page or an image we can fetch
const NON_NAVIGABLE_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Returns true if the raw attribute value uses a non-navigable pseudo-scheme
pub fn is_non_navigable(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    NON_NAVIGABLE_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

/// Checks whether a URL belongs to the same site as the seed
///
/// The URL is first resolved against `seed` (relative URLs inherit the seed's
/// host). It is in scope iff the result is an http(s) URL whose host and port
/// equal the seed's exactly. Empty input, pseudo-schemes and anything that
/// fails to parse are out of scope; this never panics.
///
/// # Examples
///
/// ```
/// use gallery_sweep::url::is_in_scope;
/// use url::Url;
///
/// let seed = Url::parse("https://example.com/").unwrap();
/// assert!(is_in_scope("/page/2", &seed));
/// assert!(is_in_scope("https://example.com/a.png", &seed));
/// assert!(!is_in_scope("https://cdn.example.com/a.png", &seed));
/// assert!(!is_in_scope("javascript:void(0)", &seed));
/// assert!(!is_in_scope("", &seed));
/// ```
pub fn is_in_scope(url: &str, seed: &Url) -> bool {
    let trimmed = url.trim();
    if trimmed.is_empty() || is_non_navigable(trimmed) {
        return false;
    }

    match resolve(trimmed, seed) {
        Some(resolved) => {
            matches!(resolved.scheme(), "http" | "https") && same_host(&resolved, seed)
        }
        None => false,
    }
}
