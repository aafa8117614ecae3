//! Configuration module for Creole
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use creole::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("creole.toml")).unwrap();
//! println!("Throttle delay: {}ms", config.crawler.throttle_delay);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, StoreConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
