//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a bounded timeout
//! - HTML parsing into page records and links
//! - The visit ledger that deduplicates pages across concurrent tasks
//! - Overall crawl coordination with a page budget

mod coordinator;
mod fetcher;
mod ledger;
mod parser;
mod work;

pub use coordinator::{crawl, run_crawl, Coordinator, CrawlResult};
pub use fetcher::{build_http_client, fetch_html};
pub use ledger::{ClaimOutcome, VisitLedger};
pub use parser::{discover_links, extract_page, PageRecord};
pub use work::{OutstandingWork, WorkGuard};
