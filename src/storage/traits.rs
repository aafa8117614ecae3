//! Storage traits and error types
//!
//! This module defines the trait interface for content store backends and
//! associated error types.

use crate::url::Host;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Response headers keyed by lowercase name, kept sorted
pub type Headers = BTreeMap<String, String>;

/// Errors that can occur while writing to the store
///
/// Reads never fail: any read problem is reported as a miss.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to create store directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to compress body for {}: {source}", .path.display())]
    Compress {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// A stored page: decompressed body plus its headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    pub body: Vec<u8>,
    pub headers: Headers,
}

/// Trait for content store implementations
///
/// Entries are addressed by `(host, key)` where the key is derived from the
/// URL's path and query.
pub trait ContentStore: Send + Sync {
    /// Reads the stored body, or `None` on any failure
    fn read_body(&self, host: &Host, key: &str) -> Option<Vec<u8>>;

    /// Reads the stored headers, or `None` on any failure
    fn read_headers(&self, host: &Host, key: &str) -> Option<Headers>;

    /// Writes body and headers; both are durable and visible when this returns `Ok`
    fn put(&self, host: &Host, key: &str, body: &[u8], headers: &Headers) -> StoreResult<()>;

    /// Reads a complete entry
    ///
    /// A body without its header file (e.g. after a crash between the two
    /// renames) is a miss.
    fn lookup(&self, host: &Host, key: &str) -> Option<StoreEntry> {
        let body = self.read_body(host, key)?;
        let headers = self.read_headers(host, key)?;
        Some(StoreEntry { body, headers })
    }
}
