//! Content matching: hyperlinks to follow and asset URLs to collect
//!
//! Link extraction parses markup with `scraper`. Asset extraction is a
//! best-effort pattern scan over raw bytes, so it also finds URLs inside
//! inline scripts, JSON blobs and stylesheets. Pages that only build their
//! asset URLs at runtime come back empty, which is what triggers the
//! browser fallback.

use regex::{Regex, RegexBuilder};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements and attributes that reference other documents
const LINK_SOURCES: &[(&str, &str)] = &[
    ("a[href]", "href"),
    ("area[href]", "href"),
    ("link[href]", "href"),
    ("iframe[src]", "src"),
    ("frame[src]", "src"),
];

/// Extracts every followable reference from an HTML document
///
/// Relative references are resolved against `base_url`; fragments are
/// dropped so `page#a` and `page#b` crawl as one URL.
///
/// **Excluded:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links (same page anchors)
/// - Anything that is not HTTP(S) after resolution
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for (selector, attr) in LINK_SOURCES {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };
        for element in document.select(&selector) {
            let Some(href) = element.value().attr(attr) else {
                continue;
            };
            if let Some(absolute) = resolve_link(href, base_url) {
                if seen.insert(absolute.clone()) {
                    links.push(absolute);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL, or None if it should not be followed
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let mut absolute = base_url.join(href).ok()?;
    if !matches!(absolute.scheme(), "http" | "https") {
        return None;
    }
    absolute.set_fragment(None);
    Some(absolute.to_string())
}

/// Builds the case-insensitive asset pattern for a set of extensions
///
/// Returns None when no usable extension is given.
fn asset_pattern(extensions: &[String]) -> Option<Regex> {
    let alternatives: Vec<String> = extensions
        .iter()
        .map(|ext| ext.trim().trim_start_matches('.'))
        .filter(|ext| !ext.is_empty())
        .map(regex::escape)
        .collect();

    if alternatives.is_empty() {
        return None;
    }

    let pattern = format!(
        r#"[^\s"'<>()\[\]{{}}\\,;=]*\.(?:{})(?:[?#][^\s"'<>()\[\]{{}}\\,;]*)?"#,
        alternatives.join("|")
    );

    // The pattern is assembled from escaped literals, so building only fails on size limits
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::warn!("Could not build asset pattern: {}", e);
            None
        }
    }
}

/// Scans raw content for URLs ending in one of `extensions`
///
/// Matching is case-insensitive. Escaped slashes (`\/`, as found in JSON) and
/// HTML-escaped ampersands (`&amp;`, as found in attribute query strings) are
/// unescaped first. Relative matches are resolved against `base_url`, and
/// only HTTP(S) results are kept. Repeated matches within one document are
/// reported once, in first-seen order.
pub fn extract_assets(content: &[u8], extensions: &[String], base_url: &Url) -> Vec<String> {
    let Some(pattern) = asset_pattern(extensions) else {
        return Vec::new();
    };

    let text = String::from_utf8_lossy(content)
        .replace("\\/", "/")
        .replace("&amp;", "&");
    let mut seen = HashSet::new();
    let mut assets = Vec::new();

    for found in pattern.find_iter(&text) {
        // `photo.jpgx` is not a jpg
        let continues_word = text[found.end()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric());
        if continues_word {
            continue;
        }

        let candidate = found.as_str();
        let Ok(resolved) = base_url.join(candidate) else {
            tracing::trace!("Unresolvable asset candidate {}", candidate);
            continue;
        };
        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }

        let resolved = resolved.to_string();
        if seen.insert(resolved.clone()) {
            assets.push(resolved);
        }
    }

    assets
}

/// Whether a fetched body should be parsed for links
///
/// The name must carry an HTML extension and the body must contain an
/// `<html` tag or an HTML doctype.
pub fn looks_like_html(filename: &str, content: &[u8]) -> bool {
    let name = filename.to_ascii_lowercase();
    if !(name.ends_with(".html") || name.ends_with(".htm")) {
        return false;
    }

    let text = String::from_utf8_lossy(content).to_ascii_lowercase();
    text.contains("<html") || text.contains("<!doctype html")
}
