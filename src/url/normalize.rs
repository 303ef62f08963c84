use url::Url;

/// Normalizes a URL string into the key used by the visited set
///
/// Surrounding whitespace is removed. When the rest parses as an absolute URL
/// the key is its [`url::Url`] serialization with the fragment dropped, the
/// same form the content matcher produces for discovered links, so a seed
/// written as `http://host` and a link to `/` share one key. Unparseable
/// input is kept as trimmed text.
///
/// # Examples
///
/// ```
/// use asset_spider::url::normalize_url;
///
/// assert_eq!(normalize_url("  https://example.com/page \n"), "https://example.com/page");
/// assert_eq!(normalize_url("https://example.com"), "https://example.com/");
/// ```
pub fn normalize_url(url_str: &str) -> String {
    let trimmed = url_str.trim();
    match Url::parse(trimmed) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => trimmed.to_string(),
    }
}
