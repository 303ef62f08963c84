use url::Url;

/// Extracts the domain from a URL
///
/// The domain is the lowercase host, followed by `:port` when the URL names a
/// port that differs from its scheme's default. Two URLs on the same host but
/// different ports are therefore different domains, and each domain gets its
/// own download directory.
///
/// # Arguments
///
/// * `url` - The URL to extract the domain from
///
/// # Returns
///
/// * `Some(String)` - The lowercase domain
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use asset_spider::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(extract_domain(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Returns true if `link` lives on the same domain as `origin`
///
/// Unparseable links are never on the same domain.
pub fn is_same_domain(origin: &Url, link: &str) -> bool {
    let Ok(link) = Url::parse(link) else {
        return false;
    };

    match (extract_domain(origin), extract_domain(&link)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
