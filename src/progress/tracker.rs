//! Progress registry and background reporting loop

use crate::progress::{ProgressEntry, ProgressStatus};
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// What the reporting loop summarizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMode {
    /// Crawl phase: one line with finished/total task counts
    Tasks,
    /// Download phase: one fragment per unfinished file
    Files,
}

impl ProgressMode {
    /// Interval between two reports
    pub fn interval(&self) -> Duration {
        match self {
            Self::Tasks => Duration::from_secs(1),
            Self::Files => Duration::from_secs(10),
        }
    }
}

/// Entry counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressCounts {
    pub total: usize,
    pub pending: usize,
    pub downloading: usize,
    pub done: usize,
    pub failed: usize,
}

impl ProgressCounts {
    fn from_entries(entries: &[Arc<ProgressEntry>]) -> Self {
        let mut counts = Self {
            total: entries.len(),
            ..Self::default()
        };
        for entry in entries {
            match entry.status() {
                ProgressStatus::Pending => counts.pending += 1,
                ProgressStatus::Downloading => counts.downloading += 1,
                ProgressStatus::Done => counts.done += 1,
                ProgressStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// Number of entries that reached a terminal status
    pub fn finished(&self) -> usize {
        self.done + self.failed
    }
}

/// Thread-safe registry of progress entries with a periodic reporter
///
/// Entries are appended under a mutex; each entry is then mutated only by
/// the operation that registered it. [`Progress::start`] spawns the reporting
/// loop and [`Progress::finish`] prints a final report and stops it.
pub struct Progress {
    mode: ProgressMode,
    entries: Arc<Mutex<Vec<Arc<ProgressEntry>>>>,
    bar: ProgressBar,
    stop: Arc<Notify>,
    reporter: Mutex<Option<JoinHandle<()>>>,
}

impl Progress {
    /// Creates a tracker that draws a spinner line on stderr
    pub fn new(mode: ProgressMode) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner} [PROGRESS] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        Self::with_bar(mode, bar)
    }

    /// Creates a tracker that keeps counts but draws nothing
    pub fn hidden(mode: ProgressMode) -> Self {
        Self::with_bar(mode, ProgressBar::hidden())
    }

    fn with_bar(mode: ProgressMode, bar: ProgressBar) -> Self {
        Self {
            mode,
            entries: Arc::new(Mutex::new(Vec::new())),
            bar,
            stop: Arc::new(Notify::new()),
            reporter: Mutex::new(None),
        }
    }

    /// Spawns the reporting loop
    ///
    /// Calling it twice, or outside a tokio runtime, does nothing.
    pub fn start(&self) {
        let mut reporter = self.reporter.lock();
        if reporter.is_some() {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("No async runtime available, progress reporting disabled");
            return;
        };

        let mode = self.mode;
        let entries = Arc::clone(&self.entries);
        let bar = self.bar.clone();
        let stop = Arc::clone(&self.stop);

        *reporter = Some(runtime.spawn(async move {
            loop {
                let snapshot = entries.lock().clone();
                bar.set_message(render_report(mode, &snapshot));
                bar.tick();

                tokio::select! {
                    _ = stop.notified() => break,
                    _ = tokio::time::sleep(mode.interval()) => {}
                }
            }
        }));
    }

    /// Creates, stores and returns a new entry
    pub fn register(&self, id: u64) -> Arc<ProgressEntry> {
        let entry = Arc::new(ProgressEntry::new(id));
        self.entries.lock().push(Arc::clone(&entry));
        entry
    }

    /// Snapshot of every registered entry in registration order
    pub fn entries(&self) -> Vec<Arc<ProgressEntry>> {
        self.entries.lock().clone()
    }

    pub fn counts(&self) -> ProgressCounts {
        ProgressCounts::from_entries(&self.entries.lock())
    }

    /// Renders the current single-line report
    pub fn report(&self) -> String {
        render_report(self.mode, &self.entries.lock())
    }

    /// Emits a final report and stops the reporting loop
    ///
    /// Safe to call when the loop never started or already exited.
    pub async fn finish(&self) {
        let report = self.report();

        let handle = self.reporter.lock().take();
        if let Some(handle) = handle {
            self.stop.notify_one();
            if let Err(e) = handle.await {
                tracing::debug!("Progress reporter ended abnormally: {}", e);
            }
        }

        self.bar.finish_with_message(report.clone());
        tracing::info!("{}", report);
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        if let Some(handle) = self.reporter.get_mut().take() {
            handle.abort();
        }
    }
}

/// Builds the report line for a snapshot of entries
pub fn render_report(mode: ProgressMode, entries: &[Arc<ProgressEntry>]) -> String {
    let counts = ProgressCounts::from_entries(entries);

    match mode {
        ProgressMode::Tasks => {
            let mut line = format!("Tasks: [{}/{}]", counts.finished(), counts.total);
            if counts.failed > 0 {
                line.push_str(&format!(" ({} failed)", counts.failed));
            }
            line
        }
        ProgressMode::Files => {
            let pending: Vec<String> = entries
                .iter()
                .filter(|e| e.status() != ProgressStatus::Done)
                .map(|e| match e.status() {
                    ProgressStatus::Failed => format!("File {}: Failed", e.id()),
                    _ => format!("File {}: {:.1}%", e.id(), e.progress()),
                })
                .collect();

            let head = format!("Files: [{}/{}]", counts.finished(), counts.total);
            if pending.is_empty() {
                head
            } else {
                format!("{} {}", head, pending.join(" | "))
            }
        }
    }
}
