use crate::progress::ProgressStatus;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Per-operation progress record
///
/// Only the operation that registered the entry writes to it; the reporting
/// loop reads it concurrently, so both fields live in atomic cells.
#[derive(Debug)]
pub struct ProgressEntry {
    id: u64,
    /// `f64` percentage stored as raw bits
    progress: AtomicU64,
    status: AtomicU8,
}

impl ProgressEntry {
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id,
            progress: AtomicU64::new(0f64.to_bits()),
            status: AtomicU8::new(ProgressStatus::Pending as u8),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn status(&self) -> ProgressStatus {
        ProgressStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    pub fn set_status(&self, status: ProgressStatus) {
        self.status.store(status as u8, Ordering::Release);
        if status == ProgressStatus::Done {
            self.set_progress(100.0);
        }
    }

    /// Fractional progress in `0.0..=100.0`
    pub fn progress(&self) -> f64 {
        f64::from_bits(self.progress.load(Ordering::Acquire))
    }

    /// Sets the percentage, clamped to `0.0..=100.0`
    pub fn set_progress(&self, percent: f64) {
        let clamped = if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 100.0)
        };
        self.progress.store(clamped.to_bits(), Ordering::Release);
    }

    /// Updates the percentage from a byte count and the expected total
    ///
    /// An unknown total (0) leaves the percentage untouched.
    pub fn update(&self, received: u64, total: u64) {
        if total > 0 {
            self.set_progress(100.0 * received as f64 / total as f64);
        }
    }
}
