//! HTML parser for extracting page records and links
//!
//! This module handles parsing HTML content to extract:
//! - The page heading (first `<h1>`)
//! - An excerpt (first `<p>`, preferring one inside `<main>`)
//! - Outgoing links (from `<a href>` tags)
//! - Image URLs (from `<img src>` tags)
//!
//! Every function here is pure and total: missing elements produce empty
//! values rather than errors.

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Structured content extracted from one HTML page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    /// The URL the page was fetched from
    pub url: String,

    /// Text of the first `<h1>`, or empty
    pub title: String,

    /// Text of the first paragraph, or empty
    pub excerpt: String,

    /// Absolute URLs of every anchor on the page, in document order
    pub outgoing_links: Vec<String>,

    /// Absolute URLs of every image on the page, in document order
    pub image_urls: Vec<String>,
}

/// Extracts a page record from HTML content
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `page_url` - The URL of the page, used to resolve relative references
///
/// # Example
///
/// ```
/// use site_crawler::crawler::extract_page;
///
/// let html = r#"<html><body><h1>Test</h1><p>Hello.</p><a href="/next">Next</a></body></html>"#;
/// let record = extract_page(html, "https://example.com/");
/// assert_eq!(record.title, "Test");
/// assert_eq!(record.excerpt, "Hello.");
/// assert_eq!(record.outgoing_links, vec!["https://example.com/next".to_string()]);
/// ```
pub fn extract_page(html: &str, page_url: &str) -> PageRecord {
    let document = Html::parse_document(html);
    let base_url = Url::parse(page_url).ok();

    PageRecord {
        url: page_url.to_string(),
        title: extract_title(&document),
        excerpt: extract_excerpt(&document),
        outgoing_links: collect_attribute_urls(&document, "a[href]", "href", base_url.as_ref()),
        image_urls: collect_attribute_urls(&document, "img[src]", "src", base_url.as_ref()),
    }
}

/// Discovers the links on a page, resolved to absolute URLs
///
/// Relative references are resolved against `page_url`. Hrefs that cannot be
/// resolved are skipped.
pub fn discover_links(html: &str, page_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let base_url = Url::parse(page_url).ok();
    collect_attribute_urls(&document, "a[href]", "href", base_url.as_ref())
}

/// Extracts the text of the first `<h1>`
fn extract_title(document: &Html) -> String {
    let Ok(selector) = Selector::parse("h1") else {
        return String::new();
    };

    document
        .select(&selector)
        .next()
        .map(element_text)
        .unwrap_or_default()
}

/// Extracts the first paragraph, looking inside `<main>` first
fn extract_excerpt(document: &Html) -> String {
    let (Ok(main_selector), Ok(p_selector)) = (Selector::parse("main"), Selector::parse("p"))
    else {
        return String::new();
    };

    let in_main = document
        .select(&main_selector)
        .next()
        .and_then(|main| main.select(&p_selector).next());

    in_main
        .or_else(|| document.select(&p_selector).next())
        .map(element_text)
        .unwrap_or_default()
}

/// Concatenates an element's text nodes, trimming each one
///
/// Nothing is inserted between nodes, so `<p>a<b>b</b></p>` reads "ab".
fn element_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

/// Collects one attribute from every matching element, resolved to absolute URLs
fn collect_attribute_urls(
    document: &Html,
    selector: &str,
    attribute: &str,
    base_url: Option<&Url>,
) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attribute))
        .filter_map(|value| resolve_link(value, base_url))
        .collect()
}

/// Resolves a link reference to an absolute URL
///
/// Returns None when the reference is neither absolute nor resolvable
/// against the base URL.
fn resolve_link(href: &str, base_url: Option<&Url>) -> Option<String> {
    let href = href.trim();

    let resolved = match base_url {
        Some(base) => base.join(href),
        None => Url::parse(href),
    };

    resolved.ok().map(|url| absolute_form(url, href))
}

/// Renders a resolved URL, keeping a bare host exactly as written
///
/// `Url` always serializes an empty path as `/`; a link written as
/// `https://host` is reported without the added slash.
fn absolute_form(url: Url, href: &str) -> String {
    let rendered = url.to_string();
    if url.path() == "/"
        && url.query().is_none()
        && url.fragment().is_none()
        && !href.ends_with('/')
        && href.contains("://")
    {
        rendered.trim_end_matches('/').to_string()
    } else {
        rendered
    }
}
