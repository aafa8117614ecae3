//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! A robots.txt that is missing or cannot be read never blocks the crawl: it
//! resolves to an allow-all policy.

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::RobotsPolicy;

use crate::url::Host;
use reqwest::Client;

/// Fetches and parses robots.txt for a host
///
/// # Arguments
///
/// * `client` - The HTTP client to use (carries the crawler's user agent).
///   It should follow redirects across origins, since robots.txt often
///   redirects to another scheme or host.
/// * `host` - The host whose `/robots.txt` should be read
///
/// # Returns
///
/// The parsed policy. An allow-all policy is returned for a 4xx or 5xx
/// status, a transport failure, or a body that cannot be decoded.
pub async fn fetch_robots(client: &Client, host: &Host) -> RobotsPolicy {
    let robots_url = host.robots_url();

    let response = match client.get(&robots_url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("Could not fetch {}: {}; allowing all", robots_url, e);
            return RobotsPolicy::allow_all();
        }
    };

    let status = response.status();
    if !status.is_success() {
        tracing::debug!("{} returned HTTP {}; allowing all", robots_url, status.as_u16());
        return RobotsPolicy::allow_all();
    }

    match response.text().await {
        Ok(body) => RobotsPolicy::from_content(&body),
        Err(e) => {
            tracing::debug!("Could not read {}: {}; allowing all", robots_url, e);
            RobotsPolicy::allow_all()
        }
    }
}
