use crate::url::CanonicalUrl;
use std::fmt;
use url::Url;

/// The origin part of a URL: scheme, hostname and non-default port
///
/// This is the key for everything the crawler tracks per host: the robots.txt
/// cache, the throttle clocks and the per-host store directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Host {
    scheme: String,
    hostname: String,
    port: Option<u16>,
}

impl Host {
    /// Extracts the host of a canonical URL
    ///
    /// # Examples
    ///
    /// ```
    /// use creole::url::{normalize, Host};
    ///
    /// let url = normalize("https://Example.com:8443/path", None).unwrap();
    /// let host = Host::of(&url);
    /// assert_eq!(host.authority(), "example.com:8443");
    /// assert_eq!(host.to_string(), "https://example.com:8443");
    /// ```
    pub fn of(url: &CanonicalUrl) -> Self {
        Self::from_url(url.as_url())
    }

    /// Extracts the host of any parsed URL
    ///
    /// Used where a URL has not been canonicalized yet, such as redirect
    /// targets. A URL without a host yields an empty hostname.
    pub fn from_url(url: &Url) -> Self {
        Self {
            scheme: url.scheme().to_string(),
            // The url parser already lowercased the host and dropped default ports
            hostname: url.host_str().unwrap_or_default().to_string(),
            port: url.port(),
        }
    }

    /// Returns the URL scheme (`http` or `https`)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the hostname plus the port when it is not the default one
    pub fn authority(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.hostname, port),
            None => self.hostname.clone(),
        }
    }

    /// Returns the location of this host's robots.txt
    pub fn robots_url(&self) -> String {
        format!("{}/robots.txt", self)
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority())
    }
}

/// Checks whether two URLs share an origin (scheme, host and port)
///
/// The relation is reflexive and symmetric.
///
/// # Examples
///
/// ```
/// use creole::url::{normalize, same_origin};
///
/// let a = normalize("http://example.com/a", None).unwrap();
/// let b = normalize("http://EXAMPLE.com:80/b", None).unwrap();
/// let c = normalize("https://example.com/a", None).unwrap();
/// assert!(same_origin(&a, &b));
/// assert!(!same_origin(&a, &c));
/// ```
pub fn same_origin(a: &CanonicalUrl, b: &CanonicalUrl) -> bool {
    Host::of(a) == Host::of(b)
}
