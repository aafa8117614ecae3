//! Robots.txt caching implementation
//!
//! Policies are fetched lazily the first time a host is seen and then kept for
//! the lifetime of the cache. There is no expiry: a crawl run is expected to
//! be short enough that a stale policy is acceptable.

use crate::robots::{fetch_robots, RobotsPolicy};
use crate::url::{CanonicalUrl, Host};
use reqwest::Client;
use std::collections::HashMap;

/// Per-host robots.txt policies for one crawl
#[derive(Debug)]
pub struct RobotsCache {
    client: Client,
    product_token: String,
    policies: HashMap<Host, RobotsPolicy>,
    fetches: usize,
}

impl RobotsCache {
    /// Creates an empty cache
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used to download robots.txt files
    /// * `product_token` - The crawler name matched against `User-agent` lines
    pub fn new(client: Client, product_token: impl Into<String>) -> Self {
        Self {
            client,
            product_token: product_token.into(),
            policies: HashMap::new(),
            fetches: 0,
        }
    }

    /// Returns the policy for a host, fetching it on first use
    ///
    /// At most one fetch is made per host; failures are cached as allow-all
    /// just like successes.
    pub async fn get_policy(&mut self, host: &Host) -> &RobotsPolicy {
        if !self.policies.contains_key(host) {
            tracing::debug!("Fetching robots.txt for {}", host);
            let policy = fetch_robots(&self.client, host).await;
            self.fetches += 1;
            self.policies.insert(host.clone(), policy);
        }

        self.policies
            .entry(host.clone())
            .or_insert_with(RobotsPolicy::allow_all)
    }

    /// Checks whether the crawler may fetch a URL
    pub async fn can_fetch(&mut self, url: &CanonicalUrl) -> bool {
        let host = Host::of(url);
        let token = self.product_token.clone();
        self.get_policy(&host).await.is_allowed(url.as_str(), &token)
    }

    /// Returns the Crawl-delay the host advertises for this crawler, if any
    pub async fn crawl_delay(&mut self, host: &Host) -> Option<f64> {
        let token = self.product_token.clone();
        self.get_policy(host).await.crawl_delay(&token)
    }

    /// Number of robots.txt fetches made so far
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    /// Returns true if a policy for this host is already cached
    pub fn contains(&self, host: &Host) -> bool {
        self.policies.contains_key(host)
    }
}
