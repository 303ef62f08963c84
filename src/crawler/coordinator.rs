//! Crawler coordinator - recursive, domain-scoped crawl orchestration
//!
//! One call to [`Coordinator::start`] is one crawl run. A coordinator serves
//! a single run: its progress tracker is finished when the run ends. Every
//! seed becomes a root branch; every branch fetches its page, fans out into
//! the same-domain links it finds, waits for those children, then collects
//! the page's assets. All branches share one [`VisitedSet`] and one
//! [`AssetMap`] for the run.

use crate::browser::{render_or_empty, PageRenderer};
use crate::config::{Config, SeedEntry};
use crate::crawler::matcher::{extract_assets, extract_links, looks_like_html};
use crate::fetch::HttpClient;
use crate::progress::{Progress, ProgressStatus};
use crate::state::{AssetMap, VisitedSet};
use crate::url::{extract_domain, is_same_domain, normalize_url};
use crate::SpiderError;
use futures::future::{join_all, BoxFuture};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use url::Url;

/// Everything one crawl run produced
#[derive(Debug)]
pub struct CrawlOutcome {
    /// Asset URLs grouped by domain
    pub assets: AssetMap,
    /// Every URL claimed for fetching, including failed ones
    pub visited: VisitedSet,
}

/// State scoped to a single run
#[derive(Default)]
struct CrawlRun {
    visited: VisitedSet,
    assets: AssetMap,
    next_task: AtomicU64,
}

impl CrawlRun {
    fn next_task_id(&self) -> u64 {
        self.next_task.fetch_add(1, Ordering::Relaxed)
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    seeds: Vec<SeedEntry>,
    client: HttpClient,
    renderer: Arc<dyn PageRenderer>,
    render_permits: Semaphore,
    progress: Progress,
    ran: AtomicBool,
}

impl Coordinator {
    /// Creates a coordinator for the configured seeds
    ///
    /// # Arguments
    ///
    /// * `config` - Seeds and the render concurrency cap
    /// * `client` - HTTP client used for every page fetch
    /// * `renderer` - Browser fallback for pages without static matches
    /// * `progress` - Tracker receiving one entry per fetch and per render
    pub fn new(
        config: &Config,
        client: HttpClient,
        renderer: Arc<dyn PageRenderer>,
        progress: Progress,
    ) -> Self {
        Self {
            seeds: config.urls.clone(),
            client,
            renderer,
            render_permits: Semaphore::new(config.render_concurrency.max(1)),
            progress,
            ran: AtomicBool::new(false),
        }
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Crawls every seed and returns the discovered assets
    ///
    /// Fails only when there is nothing to crawl or this coordinator already
    /// ran; per-URL failures are recorded as `Failed` progress entries.
    pub async fn start(&self) -> Result<AssetMap, SpiderError> {
        self.run().await.map(|outcome| outcome.assets)
    }

    /// Like [`Coordinator::start`], also returning the visited set
    pub async fn run(&self) -> Result<CrawlOutcome, SpiderError> {
        if self.seeds.is_empty() {
            return Err(SpiderError::NoSeeds);
        }
        if self.ran.swap(true, Ordering::SeqCst) {
            return Err(SpiderError::AlreadyRan);
        }

        tracing::info!("Starting crawl of {} seed(s)", self.seeds.len());
        let started = Instant::now();
        let run = CrawlRun::default();

        self.progress.start();
        let roots = self.seeds.iter().map(|seed| {
            self.crawl(&run, seed.url.clone(), &seed.extensions, run.next_task_id())
        });
        join_all(roots).await;
        self.progress.finish().await;

        let counts = self.progress.counts();
        tracing::info!(
            "Crawl completed: {} page(s) visited, {} failed, {} asset(s) across {} domain(s) in {:?}",
            run.visited.len(),
            counts.failed,
            run.assets.asset_count(),
            run.assets.len(),
            started.elapsed()
        );

        Ok(CrawlOutcome {
            assets: run.assets,
            visited: run.visited,
        })
    }

    /// Crawls one URL and, recursively, the same-domain pages it links to
    ///
    /// The URL is claimed in the visited set before any I/O, so each URL is
    /// fetched at most once per run no matter how many branches discover it.
    fn crawl<'a>(
        &'a self,
        run: &'a CrawlRun,
        url: String,
        extensions: &'a [String],
        task_id: u64,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let url = normalize_url(&url);
            if !run.visited.insert(&url) {
                tracing::trace!("Already visited {}", url);
                return;
            }

            let entry = self.progress.register(task_id);
            entry.set_status(ProgressStatus::Downloading);

            let page = match self.client.get(&url).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!("Failed to fetch {}: {}", url, e);
                    entry.set_status(ProgressStatus::Failed);
                    return;
                }
            };

            let origin = match Url::parse(&url) {
                Ok(origin) => origin,
                Err(e) => {
                    tracing::warn!("Cannot resolve links against {}: {}", url, e);
                    entry.set_status(ProgressStatus::Failed);
                    return;
                }
            };
            let Some(domain) = extract_domain(&origin) else {
                tracing::warn!("No domain in {}", url);
                entry.set_status(ProgressStatus::Failed);
                return;
            };
            run.assets.ensure_domain(&domain);

            if looks_like_html(&page.filename, &page.content) {
                let children: Vec<String> = extract_links(&page.text(), &origin)
                    .into_iter()
                    .filter(|link| is_same_domain(&origin, link) && !run.visited.contains(link))
                    .collect();

                tracing::debug!("{}: following {} link(s)", url, children.len());
                let branches = children
                    .into_iter()
                    .map(|link| self.crawl(run, link, extensions, run.next_task_id()));
                join_all(branches).await;
            }

            let assets = extract_assets(&page.content, extensions, &origin);
            if assets.is_empty() {
                self.render_fallback(run, &url, &origin, &domain, extensions)
                    .await;
            } else {
                tracing::debug!("{}: {} asset(s)", url, assets.len());
                run.assets.append(&domain, assets);
            }

            entry.set_status(ProgressStatus::Done);
        })
    }

    /// Re-extracts assets from the browser-rendered page
    ///
    /// Renderer failures count as an empty page.
    async fn render_fallback(
        &self,
        run: &CrawlRun,
        url: &str,
        origin: &Url,
        domain: &str,
        extensions: &[String],
    ) {
        if !self.renderer.is_enabled() {
            return;
        }

        let Ok(_permit) = self.render_permits.acquire().await else {
            return;
        };

        let entry = self.progress.register(run.next_task_id());
        entry.set_status(ProgressStatus::Downloading);

        let html = render_or_empty(self.renderer.as_ref(), url).await;
        let assets = extract_assets(html.as_bytes(), extensions, origin);
        tracing::debug!(
            "{}: {} asset(s) after {} rendering",
            url,
            assets.len(),
            self.renderer.name()
        );
        if !assets.is_empty() {
            run.assets.append(domain, assets);
        }

        entry.set_status(ProgressStatus::Done);
    }
}
