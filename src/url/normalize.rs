use crate::{UrlError, UrlResult};
use url::form_urlencoded::byte_serialize;
use url::Url;

/// Schemes that never point at a detail page
const EXCLUDED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Resolves a listing anchor's `href` into a canonical candidate URL
///
/// # Canonicalization Steps
///
/// 1. Trim whitespace; reject empty and fragment-only hrefs
/// 2. Reject `javascript:`, `mailto:`, `tel:` and `data:` links
/// 3. Resolve relative hrefs against the page the anchor was rendered on
/// 4. Accept only HTTP and HTTPS results
/// 5. Drop the fragment
///
/// Query strings are kept as-is: result feeds commonly encode the place
/// identity in them, so two hrefs differing only in query are different places.
///
/// # Examples
///
/// ```
/// use gleaner::url::canonical_candidate;
/// use url::Url;
///
/// let base = Url::parse("https://maps.example.com/search/pizza").unwrap();
/// let url = canonical_candidate("/place/luigis#reviews", &base).unwrap();
/// assert_eq!(url.as_str(), "https://maps.example.com/place/luigis");
/// ```
pub fn canonical_candidate(href: &str, base_url: &Url) -> UrlResult<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return Err(UrlError::Excluded(href.to_string()));
    }

    let lowered = href.to_ascii_lowercase();
    if EXCLUDED_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
        return Err(UrlError::Excluded(href.to_string()));
    }

    let mut url = base_url
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    url.set_fragment(None);

    Ok(url)
}

/// Builds the search page URL by substituting the form-encoded query
///
/// # Examples
///
/// ```
/// use gleaner::url::build_search_url;
///
/// let url = build_search_url(
///     "https://www.google.com/maps/search/{query}?hl=en",
///     "restaurants in New York",
/// )
/// .unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://www.google.com/maps/search/restaurants+in+New+York?hl=en"
/// );
/// ```
pub fn build_search_url(template: &str, query: &str) -> UrlResult<Url> {
    let encoded: String = byte_serialize(query.trim().as_bytes()).collect();
    let raw = template.replace("{query}", &encoded);

    Url::parse(&raw).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))
}
