//! HTTP fetching
//!
//! Every request the crawler and the download manager make goes through
//! [`HttpClient`]. A fetch either yields a fully read [`FetchedPage`] or a
//! [`FetchError`] saying why it failed; callers decide whether that is fatal.

mod client;
pub mod filename;

use thiserror::Error;

pub use client::{ClientOptions, FetchedPage, HttpClient, DEFAULT_USER_AGENT};

/// Reasons a single fetch can fail
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request failed for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Failed to build HTTP client: {source}")]
    Build {
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Classifies a transport error
    pub(crate) fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        let url = url.to_string();
        if source.is_timeout() {
            FetchError::Timeout { url }
        } else if source.is_connect() {
            FetchError::Connect { url, source }
        } else {
            FetchError::Request { url, source }
        }
    }
}
