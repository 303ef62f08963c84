//! State shared by the concurrent branches of one crawl run
//!
//! # Components
//!
//! - `VisitedSet`: URLs already claimed for fetching; guarantees one fetch per URL
//! - `AssetMap`: discovered asset URLs grouped by domain

mod asset_map;
mod visited;

// Re-export main types
pub use asset_map::AssetMap;
pub use visited::VisitedSet;
