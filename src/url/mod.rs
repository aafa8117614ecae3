//! URL handling module for Creole
//!
//! This module provides URL canonicalization, origin comparison and
//! storage-key derivation. Everything here is pure: no I/O, no shared state.

mod domain;
mod key;
mod normalize;

// Re-export main functions
pub use domain::{same_origin, Host};
pub use key::{hashed_storage_key, storage_key, KeyScheme, MAX_KEY_LEN};
pub use normalize::{normalize, CanonicalUrl};
