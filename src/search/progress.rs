// file: src/search/progress.rs
// description: per-search statistics and cluster progress reporting
// reference: uses indicatif for progress bars and tracks dispatch metrics

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchStats {
    pub documents: usize,
    pub clusters: usize,
    pub oversized_clusters: usize,
    pub clusters_succeeded: usize,
    pub clusters_failed: usize,
    pub clusters_abandoned: usize,
    pub model_attempts: u32,
    pub relevant_ids: usize,
    pub materialized: usize,
    pub elapsed_secs: f64,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_rate(&self) -> f64 {
        if self.clusters == 0 {
            return 0.0;
        }
        (self.clusters_succeeded as f64 / self.clusters as f64) * 100.0
    }

    pub fn documents_per_second(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.documents as f64 / self.elapsed_secs
    }

    pub fn log_summary(&self) {
        info!("=== Search Summary ===");
        info!("Duration: {:.2} seconds", self.elapsed_secs);
        info!("Documents considered: {}", self.documents);
        info!(
            "Clusters: {} ({} oversized)",
            self.clusters, self.oversized_clusters
        );
        info!(
            "Clusters succeeded/failed/abandoned: {}/{}/{}",
            self.clusters_succeeded, self.clusters_failed, self.clusters_abandoned
        );
        info!("Model attempts: {}", self.model_attempts);
        info!("Success rate: {:.2}%", self.success_rate());
        info!(
            "Relevant ids: {} | Materialized: {}",
            self.relevant_ids, self.materialized
        );
        info!("Throughput: {:.2} docs/sec", self.documents_per_second());
        info!("======================");
    }
}

/// Terminal progress for clusters completing during one search.
pub struct ClusterProgress {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
}

impl ClusterProgress {
    pub fn new(total_clusters: usize, colored: bool) -> Self {
        let multi_progress = MultiProgress::new();

        Self {
            main_bar: create_progress_bar(&multi_progress, total_clusters as u64, colored),
            detail_bar: create_detail_bar(&multi_progress),
            succeeded: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    pub fn hidden() -> Self {
        Self {
            main_bar: ProgressBar::hidden(),
            detail_bar: ProgressBar::hidden(),
            succeeded: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    pub fn inc_succeeded(&self) {
        self.succeeded.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn finish(&self) {
        if !self.main_bar.is_finished() {
            self.main_bar.finish_with_message("Relevance judging complete");
        }
        self.detail_bar.finish_and_clear();
    }

    fn update_detail_bar(&self) {
        let failed = self.failed();
        let failed_text = if failed > 0 {
            format!("Failed: {}", failed).red().to_string()
        } else {
            format!("Failed: {}", failed)
        };

        self.detail_bar
            .set_message(format!("Clusters judged: {} | {}", self.succeeded(), failed_text));
    }
}

impl Drop for ClusterProgress {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, total: u64, colored: bool) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(total));
    let (template, chars) = if colored {
        (
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} clusters {msg}",
            "█▓▒░",
        )
    } else {
        (
            "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} clusters {msg}",
            "=>-",
        )
    };

    let style = ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(chars);
    bar.set_style(style);
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    let style = ProgressStyle::default_bar()
        .template("{msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_stats_calculations() {
        let mut stats = SearchStats::new();
        stats.documents = 100;
        stats.clusters = 4;
        stats.clusters_succeeded = 3;
        stats.elapsed_secs = 10.0;

        assert_eq!(stats.documents_per_second(), 10.0);
        assert_eq!(stats.success_rate(), 75.0);
    }

    #[test]
    fn test_search_stats_zero_values() {
        let stats = SearchStats::new();
        assert_eq!(stats.documents_per_second(), 0.0);
        assert_eq!(stats.success_rate(), 0.0);
    }

    #[test]
    fn test_cluster_progress_counts() {
        let progress = ClusterProgress::hidden();

        progress.inc_succeeded();
        progress.inc_failed();
        progress.inc_failed();

        assert_eq!(progress.succeeded(), 1);
        assert_eq!(progress.failed(), 2);
    }
}
