//! Configuration module for Asset-Spider
//!
//! This module handles loading, parsing, and validating YAML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use asset_spider::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.yaml")).unwrap();
//! println!("Downloading into: {}", config.target);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserKind, Config, CookieEntry, SeedEntry, DEFAULT_DOWNLOAD_CONCURRENCY,
    DEFAULT_RENDER_CONCURRENCY, DEFAULT_TIMEOUT_SECS, DEFAULT_WEBDRIVER_URL,
};

// Re-export parser functions
pub use parser::{load_config, parse_config, DEFAULT_CONFIG_PATH};
