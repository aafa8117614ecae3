use crate::url::KeyScheme;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Creole
///
/// Every section has defaults, so an empty file (or no file at all) yields a
/// usable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Minimum time between requests to the same host (milliseconds)
    #[serde(rename = "throttle-delay")]
    pub throttle_delay: u64,

    /// Whether a robots.txt Crawl-delay may raise the per-host delay
    #[serde(rename = "respect-crawl-delay")]
    pub respect_crawl_delay: bool,

    /// Total request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl CrawlerConfig {
    pub fn throttle_delay(&self) -> Duration {
        Duration::from_millis(self.throttle_delay)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            throttle_delay: 1000,
            respect_crawl_delay: true,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler; also the product token matched against robots.txt
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value: `Name/Version`
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "Creole".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Content store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root directory of the content store
    pub root: String,

    /// How storage keys are derived from URLs
    #[serde(rename = "key-scheme")]
    pub key_scheme: KeyScheme,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: ".store".to_string(),
            key_scheme: KeyScheme::Base64,
        }
    }
}
