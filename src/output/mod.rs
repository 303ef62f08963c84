//! Output module for end-of-phase summaries
//!
//! This module prints:
//! - The crawl summary (assets per domain, optionally every asset URL)
//! - The download summary (completed, failed and skipped counts)

pub mod stats;

pub use stats::{crawl_statistics, print_crawl_summary, print_download_summary, CrawlStatistics};
