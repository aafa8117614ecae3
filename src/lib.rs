//! Creole: a polite single-origin web crawler
//!
//! This crate implements a web crawler that starts from one seed URL, stays on
//! that URL's origin, respects robots.txt and a per-host throttle delay, and
//! persists every fetched page to a local content store.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Creole operations
#[derive(Debug, Error)]
pub enum CreoleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Crawl error: {0}")]
    Crawl(#[from] crawler::CrawlError),

    #[error("Storage error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Creole operations
pub type Result<T> = std::result::Result<T, CreoleError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use crate::config::Config;
pub use crate::crawler::{CrawlError, Document, Engine, Fetcher};
pub use crate::output::CrawlReport;
pub use crate::url::{normalize, same_origin, storage_key, CanonicalUrl, Host};
