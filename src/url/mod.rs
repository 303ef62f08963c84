//! URL handling module for Asset-Spider
//!
//! This module provides crawl-key normalization, domain extraction and the
//! same-domain test used to keep traversal inside the origin host.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, is_same_domain};
pub use normalize::normalize_url;
