//! Filesystem content store
//!
//! Bodies are compressed with zstd. Every file is first written under a
//! `.tmp` name, synced, and then renamed into place, so a reader sees either
//! the old file, the new file, or nothing.

use crate::storage::{format_headers, parse_headers, ContentStore, Headers, StoreError, StoreResult};
use crate::url::Host;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// zstd level used for page bodies
const COMPRESSION_LEVEL: i32 = 3;

/// Suffix of the header sidecar file
const HEADERS_SUFFIX: &str = ".headers";

/// Suffix of in-progress writes
const TMP_SUFFIX: &str = ".tmp";

/// Content store rooted at a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Creates a store rooted at `root`
    ///
    /// Nothing is created on disk until the first `put`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the store's root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the directory holding a host's entries
    pub fn host_dir(&self, host: &Host) -> PathBuf {
        self.root.join(host.authority())
    }

    /// Returns the path of a compressed body
    pub fn body_path(&self, host: &Host, key: &str) -> PathBuf {
        self.host_dir(host).join(key)
    }

    /// Returns the path of a header sidecar file
    pub fn headers_path(&self, host: &Host, key: &str) -> PathBuf {
        self.host_dir(host).join(format!("{}{}", key, HEADERS_SUFFIX))
    }
}

impl ContentStore for FsStore {
    fn read_body(&self, host: &Host, key: &str) -> Option<Vec<u8>> {
        let path = self.body_path(host, key);
        let compressed = fs::read(&path).ok()?;

        match zstd::stream::decode_all(compressed.as_slice()) {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!("Ignoring undecodable store entry {}: {}", path.display(), e);
                None
            }
        }
    }

    fn read_headers(&self, host: &Host, key: &str) -> Option<Headers> {
        let content = fs::read_to_string(self.headers_path(host, key)).ok()?;
        Some(parse_headers(&content))
    }

    fn put(&self, host: &Host, key: &str, body: &[u8], headers: &Headers) -> StoreResult<()> {
        let dir = self.host_dir(host);
        fs::create_dir_all(&dir).map_err(|source| StoreError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let body_path = self.body_path(host, key);
        let compressed = zstd::bulk::compress(body, COMPRESSION_LEVEL).map_err(|source| {
            StoreError::Compress {
                path: body_path.clone(),
                source,
            }
        })?;
        write_atomic(&body_path, &compressed)?;

        // A crash here leaves the new body next to an old or missing header file
        let headers_path = self.headers_path(host, key);
        write_atomic(&headers_path, format_headers(headers).as_bytes())?;

        tracing::debug!("Stored {} ({} bytes) under {}", key, body.len(), dir.display());
        Ok(())
    }
}

/// Writes `contents` to `<path>.tmp`, syncs it, and renames it over `path`
fn write_atomic(path: &Path, contents: &[u8]) -> StoreResult<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(TMP_SUFFIX);
    let tmp_path = PathBuf::from(tmp_name);

    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::create(&tmp_path).map_err(write_err)?;
    file.write_all(contents).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;
    drop(file);

    fs::rename(&tmp_path, path).map_err(write_err)
}
