//! HTTP fetcher implementation
//!
//! This module turns a canonical URL into a [`Document`]. It handles:
//! - Serving stored pages without downloading them again
//! - robots.txt checks and per-host throttling
//! - Following redirects within the origin only
//! - Rejecting error statuses and non-text responses
//! - Writing fresh downloads to the content store

use crate::config::Config;
use crate::crawler::{CrawlError, RateLimiter};
use crate::robots::RobotsCache;
use crate::storage::{ContentStore, FsStore, Headers};
use crate::url::{normalize, CanonicalUrl, Host, KeyScheme};
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{redirect::Policy, Client, ClientBuilder, Response};
use std::borrow::Cow;
use std::time::Duration;
use url::Url;

/// Maximum number of redirect hops followed for one request
pub const MAX_REDIRECTS: usize = 10;

/// Maximum number of redirect hops followed for a robots.txt request
pub const MAX_ROBOTS_REDIRECTS: usize = 5;

/// Upper bound on a robots.txt Crawl-delay
const MAX_CRAWL_DELAY: Duration = Duration::from_secs(60);

/// A page obtained from the network or the content store
#[derive(Debug, Clone)]
pub struct Document {
    /// Raw response body
    pub body: Vec<u8>,

    /// Response headers, lowercase names
    pub headers: Headers,

    /// URL after redirects; equal to the requested URL for store hits
    pub final_url: CanonicalUrl,

    /// True when the document was served from the content store
    pub from_store: bool,
}

impl Document {
    /// Returns the body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Returns the stored Content-Type header, if any
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(String::as_str)
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The crawler configuration (user agent and timeouts)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use creole::config::Config;
/// use creole::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    client_builder(config)
        .redirect(same_origin_redirects())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Builds the client used for robots.txt requests
///
/// Same user agent and timeouts as [`build_http_client`], but redirects are
/// followed to any origin, up to [`MAX_ROBOTS_REDIRECTS`] hops.
pub fn build_robots_client(config: &Config) -> Result<Client, reqwest::Error> {
    client_builder(config)
        .redirect(Policy::limited(MAX_ROBOTS_REDIRECTS))
        .build()
}

fn client_builder(config: &Config) -> ClientBuilder {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(Duration::from_secs(config.crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.crawler.connect_timeout_secs))
}

/// Redirect policy that follows hops within the original origin
///
/// A hop to another origin is not followed: the 3xx response is handed back
/// to the caller, which reports it as a wrong-domain failure.
fn same_origin_redirects() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() > MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }

        let leaves_origin = attempt
            .previous()
            .first()
            .map(|origin| Host::from_url(origin) != Host::from_url(attempt.url()))
            .unwrap_or(false);

        if leaves_origin {
            attempt.stop()
        } else {
            attempt.follow()
        }
    })
}

/// Returns true if a Content-Type value denotes a text document
///
/// # Examples
///
/// ```
/// use creole::crawler::is_text_content_type;
///
/// assert!(is_text_content_type("text/html; charset=utf-8"));
/// assert!(is_text_content_type("TEXT/plain"));
/// assert!(!is_text_content_type("application/xhtml+xml"));
/// assert!(!is_text_content_type(""));
/// ```
pub fn is_text_content_type(value: &str) -> bool {
    value
        .trim_start()
        .get(..5)
        .map(|prefix| prefix.eq_ignore_ascii_case("text/"))
        .unwrap_or(false)
}

/// Retrieves pages for the crawl engine
///
/// Owns everything that talks to a host: the HTTP client, the robots.txt
/// cache, the rate limiter, and the content store.
pub struct Fetcher {
    client: Client,
    robots: RobotsCache,
    limiter: RateLimiter,
    store: Box<dyn ContentStore>,
    key_scheme: KeyScheme,
    respect_crawl_delay: bool,
}

impl Fetcher {
    /// Creates a fetcher backed by a filesystem store at `config.store.root`
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let store = FsStore::new(&config.store.root);
        Self::with_store(config, Box::new(store))
    }

    /// Creates a fetcher backed by the given store
    pub fn with_store(
        config: &Config,
        store: Box<dyn ContentStore>,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;
        let robots = RobotsCache::new(
            build_robots_client(config)?,
            config.user_agent.crawler_name.clone(),
        );

        Ok(Self {
            client,
            robots,
            limiter: RateLimiter::new(config.crawler.throttle_delay()),
            store,
            key_scheme: config.store.key_scheme,
            respect_crawl_delay: config.crawler.respect_crawl_delay,
        })
    }

    /// Retrieves a page, preferring the content store over the network
    ///
    /// robots.txt is consulted first, so a disallowed URL fails even when a
    /// copy is stored. A store hit skips the throttle and the page request.
    ///
    /// # Errors
    ///
    /// Any [`CrawlError`]; only [`CrawlError::Store`] is fatal to a crawl.
    pub async fn retrieve(&mut self, url: &CanonicalUrl) -> Result<Document, CrawlError> {
        self.check_robots(url).await?;

        let key = self.key_scheme.key_for(url);
        if let Some(entry) = self.store.lookup(&Host::of(url), &key) {
            tracing::debug!("Store hit for {}", url);
            return Ok(Document {
                body: entry.body,
                headers: entry.headers,
                final_url: url.clone(),
                from_store: true,
            });
        }

        self.fetch_and_store(url).await
    }

    /// Downloads a page from the network and stores it, ignoring any stored copy
    pub async fn download(&mut self, url: &CanonicalUrl) -> Result<Document, CrawlError> {
        self.check_robots(url).await?;
        self.fetch_and_store(url).await
    }

    async fn check_robots(&mut self, url: &CanonicalUrl) -> Result<(), CrawlError> {
        if self.robots.can_fetch(url).await {
            Ok(())
        } else {
            Err(CrawlError::RobotsDenied {
                url: url.to_string(),
            })
        }
    }

    /// Fetches a robots-approved URL over the network
    ///
    /// # Request Flow
    ///
    /// 1. Apply Crawl-delay on first contact, then wait for the throttle
    /// 2. GET, following same-origin redirects (max 10 hops)
    /// 3. Reject cross-origin redirects, error statuses and non-text bodies
    /// 4. Store body and headers under the key of the final URL
    async fn fetch_and_store(&mut self, url: &CanonicalUrl) -> Result<Document, CrawlError> {
        let host = Host::of(url);

        self.apply_crawl_delay(&host).await;
        self.limiter.before_fetch(&host).await;

        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|source| CrawlError::Transport {
                url: url.to_string(),
                source,
            })?;

        let final_url = check_origin(url, &response)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let headers = collect_headers(response.headers());
        let content_type = headers.get("content-type").cloned().unwrap_or_default();
        if !is_text_content_type(&content_type) {
            return Err(CrawlError::WrongContentType {
                url: url.to_string(),
                content_type,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| CrawlError::Transport {
                url: url.to_string(),
                source,
            })?
            .to_vec();

        let key = self.key_scheme.key_for(&final_url);
        self.store.put(&Host::of(&final_url), &key, &body, &headers)?;

        if final_url != *url {
            tracing::debug!("{} redirected to {}", url, final_url);
        }

        Ok(Document {
            body,
            headers,
            final_url,
            from_store: false,
        })
    }

    /// Raises the host's throttle delay to its Crawl-delay, once per host
    async fn apply_crawl_delay(&mut self, host: &Host) {
        if !self.respect_crawl_delay || self.limiter.knows(host) {
            return;
        }

        let Some(secs) = self.robots.crawl_delay(host).await else {
            return;
        };

        match Duration::try_from_secs_f64(secs) {
            Ok(delay) => {
                let delay = delay.min(MAX_CRAWL_DELAY);
                tracing::info!("Using Crawl-delay of {:?} for {}", delay, host);
                self.limiter.set_delay(host, delay);
            }
            Err(e) => tracing::warn!("Ignoring Crawl-delay {} for {}: {}", secs, host, e),
        }
    }

    /// Returns the robots.txt cache
    pub fn robots(&self) -> &RobotsCache {
        &self.robots
    }

    /// Returns the rate limiter
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Returns the content store
    pub fn store(&self) -> &dyn ContentStore {
        self.store.as_ref()
    }
}

/// Verifies that a response did not leave the requested origin
///
/// Returns the canonical final URL on success.
fn check_origin(requested: &CanonicalUrl, response: &Response) -> Result<CanonicalUrl, CrawlError> {
    let origin = Host::of(requested);
    let wrong_domain = |target: &Url| CrawlError::WrongDomain {
        url: requested.to_string(),
        target: target.to_string(),
    };

    // A cross-origin hop was stopped by the redirect policy
    if response.status().is_redirection() {
        if let Some(target) = redirect_target(response) {
            if Host::from_url(&target) != origin {
                return Err(wrong_domain(&target));
            }
        }
    }

    let final_url =
        normalize(response.url().as_str(), None).map_err(|_| wrong_domain(response.url()))?;
    if Host::of(&final_url) != origin {
        return Err(wrong_domain(response.url()));
    }

    Ok(final_url)
}

/// Resolves the Location header of a redirect response
fn redirect_target(response: &Response) -> Option<Url> {
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    response.url().join(location).ok()
}

/// Copies response headers, joining repeated names with ", "
fn collect_headers(map: &HeaderMap) -> Headers {
    let mut headers = Headers::new();

    for (name, value) in map {
        let value = String::from_utf8_lossy(value.as_bytes());
        headers
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.to_string());
    }

    headers
}
