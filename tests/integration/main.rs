//! Integration test harness
//!
//! Every test drives the library against wiremock servers; servers on
//! different ports count as different domains.

mod crawl_tests;
mod download_tests;
