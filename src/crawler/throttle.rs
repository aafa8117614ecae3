//! Per-host request throttling
//!
//! The clock for a host is advanced *before* the request goes out, so a slow
//! or failing request still counts and a retry burst cannot happen.

use crate::url::Host;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Enforces a minimum delay between requests to the same host
#[derive(Debug)]
pub struct RateLimiter {
    /// Delay applied to every host
    default_delay: Duration,

    /// Per-host delays (e.g. from robots.txt Crawl-delay); never below the default
    delays: HashMap<Host, Duration>,

    /// Time of the last request to each host
    last_request: HashMap<Host, Instant>,
}

impl RateLimiter {
    /// Creates a limiter with the given default delay
    pub fn new(default_delay: Duration) -> Self {
        Self {
            default_delay,
            delays: HashMap::new(),
            last_request: HashMap::new(),
        }
    }

    /// Waits until `host` may be contacted again, then records "now" as its last request
    pub async fn before_fetch(&mut self, host: &Host) {
        if let Some(wait) = self.time_until_next_request(host, Instant::now()) {
            tracing::trace!("Throttling {} for {:?}", host, wait);
            tokio::time::sleep(wait).await;
        }

        self.last_request.insert(host.clone(), Instant::now());
    }

    /// Calculates the time until the next request to `host` can be made
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, host: &Host, now: Instant) -> Option<Duration> {
        let last = self.last_request.get(host)?;
        let delay = self.delay_for(host);
        let elapsed = now.saturating_duration_since(*last);
        if elapsed < delay {
            Some(delay - elapsed)
        } else {
            None
        }
    }

    /// Raises the delay for one host; values below the default are ignored
    pub fn set_delay(&mut self, host: &Host, delay: Duration) {
        self.delays.insert(host.clone(), delay.max(self.default_delay));
    }

    /// Returns the effective delay for a host
    pub fn delay_for(&self, host: &Host) -> Duration {
        self.delays
            .get(host)
            .copied()
            .unwrap_or(self.default_delay)
    }

    /// Returns the time of the last recorded request to a host
    pub fn last_request(&self, host: &Host) -> Option<Instant> {
        self.last_request.get(host).copied()
    }

    /// Returns true if a request to this host has ever been recorded
    pub fn knows(&self, host: &Host) -> bool {
        self.last_request.contains_key(host)
    }

    /// Number of hosts with a recorded request
    pub fn tracked_hosts(&self) -> usize {
        self.last_request.len()
    }
}
