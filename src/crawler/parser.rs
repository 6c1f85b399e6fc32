//! Link extractor collaborator
//!
//! Given raw HTML and the page's URL, returns the set of absolute http(s)
//! URLs found in anchor elements. Relative hrefs are resolved against the
//! page URL; schemes a crawler cannot fetch are skipped.

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts all followable links from an HTML page
pub fn extract_links(html: &str, base_url: &Url) -> HashSet<String> {
    let document = Html::parse_document(html);
    let mut links = HashSet::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute) = resolve_link(href, base_url) {
                    links.insert(absolute);
                }
            }
        }
    }

    links
}

/// Resolves an href to an absolute URL, or None when it should be skipped:
/// javascript:/mailto:/tel:/data: schemes, fragment-only anchors, invalid
/// URLs, and anything that is not http(s) after resolution.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("http://example.com/section/page").unwrap()
    }

    #[test]
    fn test_absolute_link() {
        let html = r#"<html><body><a href="http://other.com/page">Link</a></body></html>"#;
        let links = extract_links(html, &base_url());
        assert_eq!(links.len(), 1);
        assert!(links.contains("http://other.com/page"));
    }

    #[test]
    fn test_relative_links_resolved() {
        let html = r#"<html><body>
            <a href="/rooted">Rooted</a>
            <a href="sibling">Sibling</a>
        </body></html>"#;
        let links = extract_links(html, &base_url());
        assert!(links.contains("http://example.com/rooted"));
        assert!(links.contains("http://example.com/section/sibling"));
    }

    #[test]
    fn test_duplicate_hrefs_collapse() {
        let html = r#"<html><body>
            <a href="/page">One</a>
            <a href="/page">Two</a>
        </body></html>"#;
        let links = extract_links(html, &base_url());
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_unfetchable_schemes_skipped() {
        let html = r#"<html><body>
            <a href="javascript:void(0)">JS</a>
            <a href="mailto:x@example.com">Mail</a>
            <a href="tel:+123456789">Call</a>
            <a href="data:text/plain,hi">Data</a>
            <a href="ftp://example.com/file">Ftp</a>
        </body></html>"#;
        let links = extract_links(html, &base_url());
        assert!(links.is_empty());
    }

    #[test]
    fn test_fragment_only_skipped() {
        let html = r##"<html><body><a href="#top">Jump</a></body></html>"##;
        assert!(extract_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_anchors_without_href_ignored() {
        let html = r#"<html><body><a name="target">No href</a></body></html>"#;
        assert!(extract_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_malformed_html_still_yields_links() {
        let html = r#"<html><body><p><a href="/page">Unclosed<div></body>"#;
        let links = extract_links(html, &base_url());
        assert!(links.contains("http://example.com/page"));
    }
}
