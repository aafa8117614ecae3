//! Crawl statistics
//!
//! This module provides the per-run report the engine fills in while it
//! crawls, and the functions that render it for the terminal.

use crate::crawler::FailureKind;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Summary of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// The canonical seed URL
    pub seed: String,

    /// When the crawl started
    pub started_at: DateTime<Utc>,

    /// When the work queue was drained
    pub finished_at: Option<DateTime<Utc>>,

    /// Pages downloaded from the network
    pub pages_fetched: u64,

    /// Pages served from the content store
    pub store_hits: u64,

    /// Links pushed onto the work queue
    pub links_enqueued: u64,

    /// Count of skipped URLs by failure kind
    pub failures: BTreeMap<FailureKind, u64>,
}

impl CrawlReport {
    /// Starts a report for a crawl beginning now
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            started_at: Utc::now(),
            finished_at: None,
            pages_fetched: 0,
            store_hits: 0,
            links_enqueued: 0,
            failures: BTreeMap::new(),
        }
    }

    /// Counts a retrieved page
    pub fn record_page(&mut self, from_store: bool) {
        if from_store {
            self.store_hits += 1;
        } else {
            self.pages_fetched += 1;
        }
    }

    /// Counts a skipped URL
    pub fn record_failure(&mut self, kind: FailureKind) {
        *self.failures.entry(kind).or_insert(0) += 1;
    }

    /// Marks the crawl as finished now
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Pages retrieved from either source
    pub fn pages_total(&self) -> u64 {
        self.pages_fetched + self.store_hits
    }

    pub fn failure_count(&self, kind: FailureKind) -> u64 {
        self.failures.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_failures(&self) -> u64 {
        self.failures.values().sum()
    }

    /// Wall-clock duration of a finished crawl, in milliseconds
    pub fn duration_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_milliseconds())
    }
}

/// Renders a report as human-readable text
pub fn format_report(report: &CrawlReport) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "=== Crawl Report ===\n");
    let _ = writeln!(out, "Seed: {}", report.seed);
    let _ = writeln!(out, "Started: {}", report.started_at.to_rfc3339());
    match (report.finished_at, report.duration_ms()) {
        (Some(finished), Some(ms)) => {
            let _ = writeln!(
                out,
                "Finished: {} ({:.1}s)",
                finished.to_rfc3339(),
                ms as f64 / 1000.0
            );
        }
        _ => {
            let _ = writeln!(out, "Finished: -");
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Pages:");
    let _ = writeln!(out, "  Fetched: {}", report.pages_fetched);
    let _ = writeln!(out, "  From store: {}", report.store_hits);
    let _ = writeln!(out, "  Links queued: {}", report.links_enqueued);

    if !report.failures.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Skipped ({}):", report.total_failures());
        for (kind, count) in &report.failures {
            let _ = writeln!(out, "  {}: {}", kind, count);
        }
    }

    out
}

/// Prints a report to stdout
pub fn print_report(report: &CrawlReport) {
    print!("{}", format_report(report));
}
