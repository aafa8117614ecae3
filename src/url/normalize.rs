use crate::UrlError;
use std::fmt;
use url::{ParseError, Url};

/// A normalized, fragment-free absolute URL
///
/// Equality on this type is the dedup key for the whole crawler: the history,
/// the work queue and the content store all compare canonical URLs. The only
/// way to build one is through [`normalize`], so every instance has already
/// been through the same normalization steps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalUrl(Url);

impl CanonicalUrl {
    /// Returns the underlying parsed URL
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the URL as a string slice
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the path plus the query string (if any)
    ///
    /// This is the part of the URL that identifies a resource within a host.
    pub fn path_and_query(&self) -> String {
        match self.0.query() {
            Some(query) => format!("{}?{}", self.0.path(), query),
            None => self.0.path().to_string(),
        }
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Normalizes a URL, optionally resolving it against a base first
///
/// # Normalization Steps
///
/// 1. Resolve against `base` when given; otherwise parse as absolute. A string
///    with no scheme and no base is read as `http://<input>`
/// 2. Reject anything that is not `http` or `https`, or has no host
/// 3. Lowercase scheme and host, drop default ports, resolve dot segments
///    (done by the URL parser itself)
/// 4. Remove the fragment
/// 5. Remove an empty query string (trailing `?`)
///
/// The operation is idempotent, and two URLs differing only by fragment
/// normalize to the same value.
///
/// # Examples
///
/// ```
/// use creole::url::normalize;
///
/// let url = normalize("HTTP://Example.COM:80/a/../b#top", None).unwrap();
/// assert_eq!(url.as_str(), "http://example.com/b");
///
/// let link = normalize("c?x=1", Some(&url)).unwrap();
/// assert_eq!(link.as_str(), "http://example.com/c?x=1");
/// ```
pub fn normalize(input: &str, base: Option<&CanonicalUrl>) -> Result<CanonicalUrl, UrlError> {
    let input = input.trim();

    let parsed = match base {
        Some(base) => base.as_url().join(input),
        None => Url::parse(input).or_else(|e| match e {
            ParseError::RelativeUrlWithoutBase => Url::parse(&format!("http://{}", input)),
            other => Err(other),
        }),
    }
    .map_err(|e| UrlError::Parse(format!("{}: {}", input, e)))?;

    canonicalize(parsed)
}

fn canonicalize(mut url: Url) -> Result<CanonicalUrl, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlError::MissingHost),
    }

    url.set_fragment(None);

    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(CanonicalUrl(url))
}
