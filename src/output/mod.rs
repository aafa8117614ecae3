//! Output module for crawl reports
//!
//! This module handles:
//! - Recording crawl statistics while the engine runs
//! - Rendering the end-of-run summary

pub mod stats;

pub use stats::{format_report, print_report, CrawlReport};
