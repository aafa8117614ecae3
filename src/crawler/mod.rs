//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching backed by the content store
//! - HTML parsing and link extraction
//! - Per-host rate limiting
//! - The work queue and crawl history
//! - Overall crawl coordination

mod engine;
mod error;
mod fetcher;
mod frontier;
mod parser;
mod throttle;

pub use engine::{CrawlState, Engine};
pub use error::{CrawlError, FailureKind};
pub use fetcher::{
    build_http_client, build_robots_client, is_text_content_type, Document, Fetcher,
    MAX_REDIRECTS, MAX_ROBOTS_REDIRECTS,
};
pub use frontier::{History, WorkQueue};
pub use parser::{extract_links, parse_links};
pub use throttle::RateLimiter;

use crate::config::Config;
use crate::output::CrawlReport;
use crate::CreoleError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client and open the content store
/// 2. Seed the work queue
/// 3. Fetch pages and follow same-origin links until the queue is empty
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seed` - The URL to start from
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed
/// * `Err(CreoleError)` - Crawl could not start or the store failed
pub async fn crawl(config: &Config, seed: &str) -> Result<CrawlReport, CreoleError> {
    let mut engine = Engine::new(config)?;
    engine.crawl(seed).await
}
