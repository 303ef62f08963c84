use crate::fetch::HttpClient;
use crate::progress::{Progress, ProgressEntry, ProgressStatus};
use crate::state::AssetMap;
use crate::SpiderError;
use dashmap::DashSet;
use futures::future::join_all;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

/// Outcome counts of one download batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Files written to disk
    pub completed: usize,
    /// Assets that ended in `Failed`
    pub failed: usize,
    /// Repeated URLs that were not downloaded again
    pub skipped: usize,
}

impl DownloadSummary {
    /// Assets that reached a terminal status
    pub fn total(&self) -> usize {
        self.completed + self.failed
    }
}

impl fmt::Display for DownloadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} completed, {} failed, {} skipped",
            self.completed, self.failed, self.skipped
        )
    }
}

/// Downloads every asset of an [`AssetMap`] into `target/<domain>/`
///
/// At most `concurrency` downloads are in flight; the rest wait for a permit.
/// A failed download is recorded and never aborts the batch.
pub struct DownloadManager {
    target: PathBuf,
    client: HttpClient,
    permits: Semaphore,
    progress: Progress,
}

impl DownloadManager {
    pub fn new(
        target: impl Into<PathBuf>,
        client: HttpClient,
        concurrency: usize,
        progress: Progress,
    ) -> Self {
        Self {
            target: target.into(),
            client,
            permits: Semaphore::new(concurrency.max(1)),
            progress,
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Downloads the whole map and returns once every task has finished
    ///
    /// # Errors
    ///
    /// Returns [`SpiderError::Io`] only when the target root cannot be
    /// created. Per-domain directory and per-file failures are counted.
    pub async fn start(&self, assets: &AssetMap) -> Result<DownloadSummary, SpiderError> {
        tokio::fs::create_dir_all(&self.target).await?;

        let started = Instant::now();
        let downloaded = DashSet::new();
        let next_id = AtomicU64::new(1);
        let mut summary = DownloadSummary::default();
        let mut tasks = Vec::new();

        tracing::info!(
            "Downloading {} asset(s) into {}",
            assets.asset_count(),
            self.target.display()
        );

        for (domain, urls) in assets.snapshot() {
            let dir = self.target.join(&domain);
            let dir_ready = match tokio::fs::create_dir_all(&dir).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("Cannot create {}: {}", dir.display(), e);
                    false
                }
            };

            for url in urls {
                if !downloaded.insert(url.clone()) {
                    tracing::trace!("Skipping duplicate asset {}", url);
                    summary.skipped += 1;
                    continue;
                }

                let entry = self.progress.register(next_id.fetch_add(1, Ordering::Relaxed));
                if dir_ready {
                    tasks.push(self.download(url, dir.clone(), entry));
                } else {
                    entry.set_status(ProgressStatus::Failed);
                    summary.failed += 1;
                }
            }
        }

        self.progress.start();
        for written in join_all(tasks).await {
            if written {
                summary.completed += 1;
            } else {
                summary.failed += 1;
            }
        }
        self.progress.finish().await;

        tracing::info!("Downloads finished: {} in {:?}", summary, started.elapsed());
        Ok(summary)
    }

    /// Fetches one asset and writes it under `dir`, returning whether it was written
    async fn download(&self, url: String, dir: PathBuf, entry: Arc<ProgressEntry>) -> bool {
        let Ok(_permit) = self.permits.acquire().await else {
            entry.set_status(ProgressStatus::Failed);
            return false;
        };
        entry.set_status(ProgressStatus::Downloading);

        let page = match self.client.get_tracked(&url, &entry).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Failed to download {}: {}", url, e);
                entry.set_status(ProgressStatus::Failed);
                return false;
            }
        };

        let path = dir.join(&page.filename);
        match tokio::fs::write(&path, &page.content).await {
            Ok(()) => {
                tracing::debug!("Saved {} to {}", url, path.display());
                entry.set_status(ProgressStatus::Done);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to write {}: {}", path.display(), e);
                entry.set_status(ProgressStatus::Failed);
                false
            }
        }
    }
}
