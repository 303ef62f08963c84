//! Progress tracking for concurrent operations
//!
//! # Components
//!
//! - `ProgressStatus`: lifecycle of one tracked fetch, render or download
//! - `ProgressEntry`: the per-operation record, mutated only by its owner
//! - `Progress`: the shared registry plus the periodic reporting loop

mod entry;
mod status;
mod tracker;

pub use entry::ProgressEntry;
pub use status::ProgressStatus;
pub use tracker::{render_report, Progress, ProgressCounts, ProgressMode};
