//! Storage module for persisting fetched pages
//!
//! This module handles the on-disk content store, including:
//! - Per-host directories created on demand
//! - Compressed page bodies with a plain-text header sidecar
//! - Atomic writes through temporary files and renames
//!
//! Layout: `<root>/<authority>/<key>` holds the zstd-compressed body and
//! `<root>/<authority>/<key>.headers` holds one `Key: Value` line per header.

mod fs;
mod traits;

pub use fs::FsStore;
pub use traits::{ContentStore, Headers, StoreEntry, StoreError, StoreResult};

/// Renders headers as the sidecar file content: one `Key: Value` line each, sorted by key
pub fn format_headers(headers: &Headers) -> String {
    headers
        .iter()
        .map(|(key, value)| format!("{}: {}\n", key, value))
        .collect()
}

/// Parses sidecar file content back into headers
///
/// Lines without a `:` separator are skipped.
pub fn parse_headers(content: &str) -> Headers {
    content
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}
