//! Per-URL crawl failures
//!
//! Every variant except [`CrawlError::Store`] is recoverable: the engine logs
//! it and moves on to the next queued URL.

use crate::storage::StoreError;
use std::fmt;
use thiserror::Error;

/// Why a single URL could not be crawled
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("URL disallowed by robots.txt: {url}")]
    RobotsDenied { url: String },

    #[error("Not a text document ({content_type:?}): {url}")]
    WrongContentType { url: String, content_type: String },

    #[error("Redirect from {url} leaves the origin for {target}")]
    WrongDomain { url: String, target: String },

    #[error("HTTP error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("HTML parse error for {url}: {message}")]
    Parse { url: String, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Recoverable failure categories, used for logging and the crawl report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureKind {
    RobotsDenied,
    WrongContentType,
    WrongDomain,
    Transport,
    Parse,
}

impl CrawlError {
    /// Returns the failure category, or `None` for errors that must abort the run
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::RobotsDenied { .. } => Some(FailureKind::RobotsDenied),
            Self::WrongContentType { .. } => Some(FailureKind::WrongContentType),
            Self::WrongDomain { .. } => Some(FailureKind::WrongDomain),
            Self::Transport { .. } | Self::HttpStatus { .. } => Some(FailureKind::Transport),
            Self::Parse { .. } => Some(FailureKind::Parse),
            Self::Store(_) => None,
        }
    }

    /// Returns true if the crawl can continue after this error
    pub fn is_recoverable(&self) -> bool {
        self.kind().is_some()
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RobotsDenied => "robots denied",
            Self::WrongContentType => "wrong content type",
            Self::WrongDomain => "wrong domain",
            Self::Transport => "transport",
            Self::Parse => "parse",
        };
        f.write_str(name)
    }
}
