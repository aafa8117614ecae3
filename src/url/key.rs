use crate::url::CanonicalUrl;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use serde::Deserialize;
use sha2::{Digest, Sha256};

/// Maximum length of a storage key in bytes
///
/// Leaves room for the `.headers.tmp` suffix within a 255-byte filename.
pub const MAX_KEY_LEN: usize = 240;

/// How storage keys are derived from URLs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyScheme {
    /// URL-safe base64 of path+query, truncated to [`MAX_KEY_LEN`]
    #[default]
    Base64,
    /// Hex SHA-256 of path+query (fixed 64 bytes)
    Sha256,
}

impl KeyScheme {
    /// Derives the storage key for a URL under this scheme
    pub fn key_for(&self, url: &CanonicalUrl) -> String {
        match self {
            Self::Base64 => storage_key(url),
            Self::Sha256 => hashed_storage_key(url),
        }
    }
}

/// Derives the legacy storage key for a URL
///
/// Only the path and query take part, since the host already names the store
/// directory. Keys longer than [`MAX_KEY_LEN`] are cut; two long URLs sharing
/// a prefix may therefore collide, and nothing detects it.
///
/// # Examples
///
/// ```
/// use creole::url::{normalize, storage_key};
///
/// let url = normalize("http://example.com/page?x=1", None).unwrap();
/// assert_eq!(storage_key(&url), "L3BhZ2U_eD0x");
/// ```
pub fn storage_key(url: &CanonicalUrl) -> String {
    let mut key = URL_SAFE.encode(url.path_and_query());
    // base64 output is ASCII, so any byte index is a char boundary
    key.truncate(MAX_KEY_LEN);
    key
}

/// Derives a fixed-length storage key from the SHA-256 of path+query
pub fn hashed_storage_key(url: &CanonicalUrl) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.path_and_query().as_bytes());
    hex::encode(hasher.finalize())
}
