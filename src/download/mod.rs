//! Asset downloads
//!
//! Drains the crawl's [`AssetMap`](crate::state::AssetMap) into files on disk
//! with bounded concurrency, one progress entry per unique asset URL.

mod manager;

pub use manager::{DownloadManager, DownloadSummary};
