//! Asset-Spider: a domain-scoped crawler that collects and downloads assets
//!
//! This crate crawls seed URLs, follows same-domain links, collects URLs whose
//! suffix matches a requested extension set (falling back to a headless browser
//! for client-rendered pages) and downloads the collected assets to disk.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod download;
pub mod fetch;
pub mod output;
pub mod progress;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Asset-Spider operations
#[derive(Debug, Error)]
pub enum SpiderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Render error: {0}")]
    Render(#[from] browser::RenderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No seed URLs to crawl")]
    NoSeeds,

    #[error("Coordinator already ran; build a new one for another crawl")]
    AlreadyRan,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file {name} does not exist in {parent}")]
    NotFound { name: String, parent: PathBuf },

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Browser '{name}' not supported! Allowed values are: {allowed}")]
    UnsupportedBrowser { name: String, allowed: String },
}

/// Result type alias for Asset-Spider operations
pub type Result<T> = std::result::Result<T, SpiderError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use browser::{PageRenderer, RenderError};
pub use config::{BrowserKind, Config, SeedEntry};
pub use crawler::{Coordinator, CrawlOutcome};
pub use download::{DownloadManager, DownloadSummary};
pub use fetch::{FetchedPage, HttpClient};
pub use progress::{Progress, ProgressEntry, ProgressMode, ProgressStatus};
pub use state::{AssetMap, VisitedSet};
pub use url::{extract_domain, is_same_domain, normalize_url};
