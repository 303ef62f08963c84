//! Crawler module for page traversal and asset discovery
//!
//! This module contains the core crawling logic:
//! - Content matching (link and asset extraction)
//! - Recursive, domain-scoped crawl coordination with browser fallback

mod coordinator;
pub mod matcher;

pub use coordinator::{Coordinator, CrawlOutcome};
pub use matcher::{extract_assets, extract_links, looks_like_html};
