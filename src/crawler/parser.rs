//! HTML link extraction
//!
//! This module parses fetched pages and decides which of their links are
//! worth crawling:
//! - Every `<a href>` is resolved against the page URL and canonicalized
//! - Links that do not resolve to an http(s) URL are dropped silently
//! - Only links on the page's own origin are kept
//! - Links already fetched, already queued, or repeated on the page are dropped

use crate::crawler::{CrawlError, Document, History, WorkQueue};
use crate::url::{normalize, same_origin, CanonicalUrl};
use scraper::{Html, Selector};
use std::collections::HashSet;

/// Returns every link of an HTML page, resolved and canonicalized, in document order
///
/// # Arguments
///
/// * `html` - The page source
/// * `base` - The URL the page was served from
///
/// # Returns
///
/// * `Ok(Vec<CanonicalUrl>)` - Resolvable links, possibly with repeats
/// * `Err(String)` - The link selector could not be built
///
/// # Example
///
/// ```
/// use creole::crawler::parse_links;
/// use creole::url::normalize;
///
/// let base = normalize("https://example.com/docs/", None).unwrap();
/// let html = r#"<a href="intro">Intro</a> <a href="mailto:me@example.com">Mail</a>"#;
/// let links = parse_links(html, &base).unwrap();
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].as_str(), "https://example.com/docs/intro");
/// ```
pub fn parse_links(html: &str, base: &CanonicalUrl) -> Result<Vec<CanonicalUrl>, String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").map_err(|e| format!("{:?}", e))?;

    let links = document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| !href.trim().is_empty())
        .filter_map(|href| normalize(href, Some(base)).ok())
        .collect();

    Ok(links)
}

/// Extracts the links of a fetched page that should be queued next
///
/// The result is in document order and contains no duplicates. A link is kept
/// only if it shares `base`'s origin, is not in `history`, and is not already
/// in `queue`.
///
/// # Errors
///
/// Returns [`CrawlError::Parse`] if the page cannot be processed.
pub fn extract_links(
    document: &Document,
    base: &CanonicalUrl,
    history: &History,
    queue: &WorkQueue,
) -> Result<Vec<CanonicalUrl>, CrawlError> {
    let links = parse_links(&document.text(), base).map_err(|message| CrawlError::Parse {
        url: base.to_string(),
        message,
    })?;

    let mut seen = HashSet::new();
    let fresh: Vec<CanonicalUrl> = links
        .into_iter()
        .filter(|link| same_origin(link, base))
        .filter(|link| !history.contains(link) && !queue.contains(link))
        .filter(|link| seen.insert(link.clone()))
        .collect();

    tracing::trace!("{} new links on {}", fresh.len(), base);
    Ok(fresh)
}
