//! Crawl engine - the main crawl loop
//!
//! Starting from a seed URL, the engine repeatedly pops the most recently
//! discovered URL, retrieves it, and queues its unseen same-origin links until
//! the work queue is empty. Everything runs on one task, one URL at a time.

use crate::config::Config;
use crate::crawler::{extract_links, CrawlError, Fetcher, History, WorkQueue};
use crate::output::CrawlReport;
use crate::url::{normalize, CanonicalUrl};
use crate::CreoleError;

/// Whether a crawl still has work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    /// URLs are waiting in the queue
    Running,
    /// The queue is empty
    Done,
}

/// Drives a single-origin crawl
pub struct Engine {
    fetcher: Fetcher,
    history: History,
    queue: WorkQueue,
}

impl Engine {
    /// Creates an engine with a filesystem-backed fetcher
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Engine)` - Ready to crawl
    /// * `Err(CreoleError)` - The HTTP client could not be built
    pub fn new(config: &Config) -> Result<Self, CreoleError> {
        Ok(Self::with_fetcher(Fetcher::new(config)?))
    }

    /// Creates an engine around an existing fetcher
    pub fn with_fetcher(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            history: History::new(),
            queue: WorkQueue::new(),
        }
    }

    /// Crawls everything reachable from `seed` on the seed's origin
    ///
    /// Per-URL failures are logged and counted in the report. A content store
    /// write failure aborts the crawl.
    ///
    /// # Arguments
    ///
    /// * `seed` - Starting URL; a missing scheme defaults to `http`
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The queue was drained
    /// * `Err(CreoleError)` - The seed is invalid or the store failed
    pub async fn crawl(&mut self, seed: &str) -> Result<CrawlReport, CreoleError> {
        let seed = normalize(seed, None)?;
        tracing::info!("Starting crawl at {}", seed);

        let mut report = CrawlReport::new(seed.to_string());
        self.queue.push(seed);

        while let Some(url) = self.queue.pop() {
            self.visit(&url, &mut report).await?;
        }

        report.finish();
        tracing::info!(
            "Crawl finished: {} fetched, {} from store, {} failed",
            report.pages_fetched,
            report.store_hits,
            report.total_failures()
        );

        Ok(report)
    }

    /// Retrieves one URL and queues its new links
    async fn visit(
        &mut self,
        url: &CanonicalUrl,
        report: &mut CrawlReport,
    ) -> Result<(), CrawlError> {
        let document = match self.fetcher.retrieve(url).await {
            Ok(document) => document,
            Err(e) => {
                let Some(kind) = e.kind() else {
                    tracing::error!("Aborting crawl at {}: {}", url, e);
                    return Err(e);
                };
                tracing::warn!("Skipping {}: {}", url, e);
                report.record_failure(kind);
                return Ok(());
            }
        };

        if document.from_store {
            tracing::info!("Cached {}", url);
        } else {
            tracing::info!("Fetched {}", url);
        }
        report.record_page(document.from_store);

        self.history.insert(url.clone());
        self.history.insert(document.final_url.clone());

        match extract_links(&document, &document.final_url, &self.history, &self.queue) {
            Ok(links) => {
                for link in links {
                    tracing::debug!("Queued {}", link);
                    if self.queue.push(link) {
                        report.links_enqueued += 1;
                    }
                }
            }
            Err(e) => {
                tracing::warn!("No links taken from {}: {}", url, e);
                if let Some(kind) = e.kind() {
                    report.record_failure(kind);
                }
            }
        }

        Ok(())
    }

    pub fn state(&self) -> CrawlState {
        if self.queue.is_empty() {
            CrawlState::Done
        } else {
            CrawlState::Running
        }
    }

    /// URLs fetched so far, including post-redirect URLs
    pub fn history(&self) -> &History {
        &self.history
    }

    /// URLs waiting to be fetched
    pub fn queue(&self) -> &WorkQueue {
        &self.queue
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }
}
