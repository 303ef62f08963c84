/// Progress status definitions for tracked operations
///
/// Every fetch, render and download owns one entry whose status moves
/// forward through these values.
use std::fmt;

/// Represents the current status of a tracked operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ProgressStatus {
    // ===== Active States =====
    /// Registered but not started yet
    Pending = 0,

    /// Network I/O is in flight
    Downloading = 1,

    // ===== Terminal States =====
    /// Finished successfully
    Done = 2,

    /// Finished with an error that was absorbed
    Failed = 3,
}

impl ProgressStatus {
    /// Returns true if this is a terminal state (no further updates expected)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if this is an active state
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns the status label shown in progress output
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Downloading => "Downloading",
            Self::Done => "Done",
            Self::Failed => "Failed",
        }
    }

    /// Decodes the value stored in a progress entry's atomic cell
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Downloading,
            2 => Self::Done,
            3 => Self::Failed,
            _ => Self::Pending,
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
