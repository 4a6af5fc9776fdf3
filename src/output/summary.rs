//! Console summary of a finished crawl
//!
//! This module provides functionality for condensing a crawl result into
//! counts and displaying it together with per-page details.

use crate::crawler::CrawlResult;

/// Number of excerpt characters shown per page
const EXCERPT_PREVIEW_CHARS: usize = 50;

/// Crawl summary counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Total number of pages claimed
    pub total_pages: usize,

    /// Pages fetched and extracted
    pub successful: usize,

    /// Pages whose fetch failed
    pub failed: usize,

    /// Pages claimed but dropped when the crawl stopped
    pub abandoned: usize,

    /// Whether the page budget stopped the crawl
    pub budget_reached: bool,
}

impl CrawlSummary {
    /// Builds the summary counts for a crawl result
    pub fn from_result(result: &CrawlResult) -> Self {
        Self {
            total_pages: result.pages.len(),
            successful: result.successful_pages().len(),
            failed: result.failed_pages().len(),
            abandoned: result.abandoned_pages().len(),
            budget_reached: result.budget_reached,
        }
    }

    /// Percentage of claimed pages that were fetched successfully
    pub fn success_rate(&self) -> f64 {
        if self.total_pages == 0 {
            0.0
        } else {
            (self.successful as f64 / self.total_pages as f64) * 100.0
        }
    }
}

/// Prints the crawl summary and page details to stdout
pub fn print_summary(result: &CrawlResult) {
    print!("{}", format_summary(result));
}

/// Formats the crawl summary and page details
pub fn format_summary(result: &CrawlResult) -> String {
    let summary = CrawlSummary::from_result(result);
    let mut out = String::new();

    out.push_str("\n=== Crawl Complete ===\n");
    out.push_str(&format!("Seed: {}\n", result.seed_url));
    out.push_str(&format!(
        "Started: {}\n",
        result.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!(
        "Duration: {:.2}s\n",
        result.duration().num_milliseconds() as f64 / 1000.0
    ));
    out.push_str(&format!("Total pages found: {}\n", summary.total_pages));
    out.push_str(&format!(
        "Successful: {} ({:.1}%)\n",
        summary.successful,
        summary.success_rate()
    ));
    out.push_str(&format!("Failed: {}\n", summary.failed));
    if summary.abandoned > 0 {
        out.push_str(&format!("Abandoned: {}\n", summary.abandoned));
    }
    if summary.budget_reached {
        out.push_str(&format!("Page budget of {} reached\n", result.max_pages));
    }

    let failed = result.failed_pages();
    if !failed.is_empty() {
        out.push_str("\nFailed URLs:\n");
        for (url, reason) in failed {
            out.push_str(&format!("  - {} ({})\n", url, reason));
        }
    }

    let successful = result.successful_pages();
    if !successful.is_empty() {
        out.push_str("\nSuccessful Page Details:\n");
    }
    for (key, page) in successful {
        out.push_str(&format!("\n{}\n", key));
        out.push_str(&format!("  H1: {}\n", page.title));
        if page.excerpt.is_empty() {
            out.push_str("  First paragraph: (none)\n");
        } else {
            let preview: String = page.excerpt.chars().take(EXCERPT_PREVIEW_CHARS).collect();
            out.push_str(&format!("  First paragraph: {}...\n", preview));
        }
        out.push_str(&format!("  Outgoing links: {}\n", page.outgoing_links.len()));
        out.push_str(&format!("  Images: {}\n", page.image_urls.len()));
    }

    out
}
