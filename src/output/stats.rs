//! Statistics for the operator-facing summaries

use crate::download::DownloadSummary;
use crate::state::AssetMap;
use std::collections::HashSet;
use std::path::Path;

/// Aggregate statistics of one crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Domains with at least one fetched page
    pub domains: usize,
    /// Asset URLs collected, repeats included
    pub total_assets: usize,
    /// Distinct asset URLs
    pub unique_assets: usize,
    /// Asset count per domain, sorted by domain
    pub assets_by_domain: Vec<(String, usize)>,
}

/// Computes statistics from a crawl's asset map
pub fn crawl_statistics(assets: &AssetMap) -> CrawlStatistics {
    let snapshot = assets.snapshot();
    let unique: HashSet<&String> = snapshot.values().flatten().collect();

    CrawlStatistics {
        domains: snapshot.len(),
        total_assets: snapshot.values().map(Vec::len).sum(),
        unique_assets: unique.len(),
        assets_by_domain: snapshot
            .iter()
            .map(|(domain, urls)| (domain.clone(), urls.len()))
            .collect(),
    }
}

/// Prints the crawl summary, optionally listing every asset URL
pub fn print_crawl_summary(assets: &AssetMap, list_assets: bool) {
    let stats = crawl_statistics(assets);

    println!("=== Crawl Summary ===\n");
    println!("Overview:");
    println!("  Domains crawled: {}", stats.domains);
    println!(
        "  Assets found: {} ({} unique)",
        stats.total_assets, stats.unique_assets
    );
    println!();

    if stats.assets_by_domain.is_empty() {
        return;
    }

    println!("Assets by Domain:");
    for (domain, count) in &stats.assets_by_domain {
        println!("  {}: {}", domain, count);
        if list_assets {
            for url in assets.get(domain).unwrap_or_default() {
                println!("    - {}", url);
            }
        }
    }
    println!();
}

/// Prints the outcome of a download batch
pub fn print_download_summary(summary: &DownloadSummary, target: &Path) {
    println!("=== Download Summary ===\n");
    println!("  Target directory: {}", target.display());
    println!("  Completed: {}", summary.completed);
    println!("  Failed: {}", summary.failed);
    println!("  Skipped duplicates: {}", summary.skipped);

    let success_rate = if summary.total() > 0 {
        (summary.completed as f64 / summary.total() as f64) * 100.0
    } else {
        0.0
    };
    println!();
    println!(
        "Success Rate: {:.1}% ({} / {} assets downloaded)",
        success_rate,
        summary.completed,
        summary.total()
    );
}
