//! Crawler coordinator - main crawl orchestration logic
//!
//! Every URL is handled by its own task. A task claims its page in the
//! ledger, waits for a fetch slot, fetches and extracts the page, records the
//! result, and then spawns one child task per outgoing link and waits for
//! all of them. The crawl is finished when the root task's tree is finished.
//!
//! Reaching the page budget stops new claims and new spawns, and cancels
//! tasks still waiting for a slot. Fetches already running are allowed to
//! finish and are recorded, so the number of recorded pages can overshoot
//! the budget by the number of fetches in progress at that moment.

use crate::config::{validate, validate_seed_url, Config};
use crate::crawler::ledger::{ClaimOutcome, VisitLedger};
use crate::crawler::parser::{discover_links, extract_page};
use crate::crawler::work::OutstandingWork;
use crate::crawler::{build_http_client, fetch_html, PageRecord};
use crate::state::VisitState;
use crate::url::{is_same_domain, normalize_url};
use crate::CrawlerError;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Log a progress line every this many finished pages
const PROGRESS_INTERVAL: usize = 10;

type CrawlFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Final state of a crawl
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// The seed URL the crawl started from
    pub seed_url: String,

    /// Ledger snapshot: canonical URL -> visit state
    pub pages: HashMap<String, VisitState>,

    /// The page budget the crawl ran with
    pub max_pages: usize,

    /// Whether the page budget was reached
    pub budget_reached: bool,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlResult {
    /// Successfully fetched pages, sorted by canonical URL
    pub fn successful_pages(&self) -> Vec<(&str, &PageRecord)> {
        let mut pages: Vec<_> = self
            .pages
            .iter()
            .filter_map(|(key, state)| state.record().map(|record| (key.as_str(), record)))
            .collect();
        pages.sort_by(|a, b| a.0.cmp(b.0));
        pages
    }

    /// Failed pages with their failure reasons, sorted by canonical URL
    pub fn failed_pages(&self) -> Vec<(&str, &str)> {
        let mut pages: Vec<_> = self
            .pages
            .iter()
            .filter_map(|(key, state)| match state {
                VisitState::Failed(reason) => Some((key.as_str(), reason.as_str())),
                _ => None,
            })
            .collect();
        pages.sort_by(|a, b| a.0.cmp(b.0));
        pages
    }

    /// Pages claimed but never fetched because the crawl stopped first
    pub fn abandoned_pages(&self) -> Vec<&str> {
        let mut pages: Vec<_> = self
            .pages
            .iter()
            .filter(|(_, state)| !state.is_terminal())
            .map(|(key, _)| key.as_str())
            .collect();
        pages.sort_unstable();
        pages
    }

    /// Wall-clock duration of the crawl
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Main crawler coordinator structure
///
/// Shared by every crawl task behind an `Arc`.
pub struct Coordinator {
    seed: Url,
    client: Client,
    ledger: VisitLedger,
    work: Arc<OutstandingWork>,
    slots: Semaphore,
    pages_done: AtomicUsize,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `seed` - The seed URL; only pages on its domain are crawled
    /// * `client` - The HTTP client used for every fetch
    /// * `max_concurrency` - Number of fetch slots
    /// * `max_pages` - Page budget
    pub fn new(seed: Url, client: Client, max_concurrency: usize, max_pages: usize) -> Self {
        let work = Arc::new(OutstandingWork::new());

        Self {
            seed,
            client,
            ledger: VisitLedger::new(max_pages, Arc::clone(&work)),
            work,
            slots: Semaphore::new(max_concurrency),
            pages_done: AtomicUsize::new(0),
        }
    }

    /// Runs the crawl to completion and returns the final ledger
    pub async fn run(self: Arc<Self>) -> CrawlResult {
        let started_at = Utc::now();
        let seed_url = self.seed.to_string();
        tracing::info!("Starting crawl of {}", seed_url);

        let guard = self.work.register();
        let root = Arc::clone(&self).crawl_page(seed_url.clone());
        let handle = tokio::spawn(async move {
            let _guard = guard;
            root.await
        });

        if let Err(e) = handle.await {
            tracing::error!("Root crawl task failed: {}", e);
        }

        let result = CrawlResult {
            seed_url,
            pages: self.ledger.snapshot(),
            max_pages: self.ledger.max_pages(),
            budget_reached: self.ledger.is_stopping(),
            started_at,
            finished_at: Utc::now(),
        };

        tracing::info!(
            "Crawl completed: {} pages claimed, {} tasks spawned in {:?}",
            result.pages.len(),
            self.work.spawned(),
            result.duration().to_std().unwrap_or_default()
        );

        result
    }

    /// Boxes the per-URL task so it can spawn copies of itself
    fn crawl_page(self: Arc<Self>, url: String) -> CrawlFuture {
        Box::pin(async move { self.process_url(url).await })
    }

    /// Processes a single URL and, recursively, everything it links to
    async fn process_url(self: Arc<Self>, url: String) {
        if !is_same_domain(&self.seed, &url) {
            tracing::trace!("Skipping off-site URL {}", url);
            return;
        }

        let key = normalize_url(&url);

        match self.ledger.claim(&key) {
            ClaimOutcome::Claimed => {}
            ClaimOutcome::AlreadyVisited => {
                tracing::trace!("Already visited {}", key);
                return;
            }
            ClaimOutcome::BudgetExhausted => {
                tracing::info!(
                    "Page budget of {} reached, stopping crawl",
                    self.ledger.max_pages()
                );
                return;
            }
        }

        let Some(links) = self.fetch_page(&url, &key).await else {
            return;
        };

        let mut children = JoinSet::new();
        for link in links {
            if self.ledger.is_stopping() {
                tracing::debug!("Crawl is stopping, not following more links from {}", key);
                break;
            }

            let guard = self.work.register();
            let child = Arc::clone(&self).crawl_page(link);
            children.spawn(async move {
                let _guard = guard;
                child.await
            });
        }

        while let Some(joined) = children.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    tracing::error!("Crawl task under {} panicked: {}", key, e);
                }
            }
        }
    }

    /// Fetches, extracts and records one claimed page
    ///
    /// Returns the page's outgoing links, or None when the task gave up
    /// waiting for a slot because the crawl is stopping. The slot is released
    /// before this returns.
    async fn fetch_page(&self, url: &str, key: &str) -> Option<Vec<String>> {
        let _permit = tokio::select! {
            biased;
            _ = self.work.cancelled() => {
                tracing::debug!("Abandoning queued page {}", key);
                return None;
            }
            permit = self.slots.acquire() => permit.ok()?,
        };

        tracing::info!("Crawling: {}", url);

        let (outcome, links) = match fetch_html(&self.client, url).await {
            Ok(html) => {
                let record = extract_page(&html, url);
                let links = discover_links(&html, url);
                (VisitState::Succeeded(record), links)
            }
            Err(e) => {
                tracing::warn!("Error fetching {}: {}", url, e);
                (VisitState::Failed(e.to_string()), Vec::new())
            }
        };

        if let Err(e) = self.ledger.record(key, outcome) {
            tracing::error!("{}", e);
        }

        let done = self.pages_done.fetch_add(1, Ordering::SeqCst) + 1;
        if done % PROGRESS_INTERVAL == 0 {
            tracing::info!(
                "Progress: {} pages fetched, {} claimed, {} tasks outstanding",
                done,
                self.ledger.claimed(),
                self.work.live()
            );
        }

        Some(links)
    }
}

/// Crawls a site with default settings apart from the two limits
///
/// # Arguments
///
/// * `seed_url` - Where the crawl starts; must be an absolute http(s) URL
/// * `max_concurrency` - Maximum number of simultaneous fetches
/// * `max_pages` - Page budget
///
/// # Example
///
/// ```no_run
/// use site_crawler::crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let result = crawl("https://example.com/", 5, 100).await?;
/// println!("{} pages", result.successful_pages().len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    seed_url: &str,
    max_concurrency: u32,
    max_pages: u32,
) -> Result<CrawlResult, CrawlerError> {
    let mut config = Config::default();
    config.crawler.max_concurrency = max_concurrency;
    config.crawler.max_pages = max_pages;
    run_crawl(&config, seed_url).await
}

/// Runs the main crawl operation
///
/// Validates the configuration and seed, builds the HTTP client and runs a
/// [`Coordinator`] to completion. Per-page failures never make this return
/// an error; they are recorded in the result.
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Crawl finished
/// * `Err(CrawlerError)` - Invalid configuration or seed, or the HTTP
///   client could not be built
pub async fn run_crawl(config: &Config, seed_url: &str) -> Result<CrawlResult, CrawlerError> {
    validate(config)?;

    let seed = validate_seed_url(seed_url).map_err(|e| CrawlerError::InvalidSeed {
        url: seed_url.to_string(),
        reason: e.to_string(),
    })?;

    let client = build_http_client(
        &config.user_agent,
        Duration::from_secs(config.crawler.request_timeout_secs),
    )?;

    let coordinator = Arc::new(Coordinator::new(
        seed,
        client,
        config.crawler.max_concurrency as usize,
        config.crawler.max_pages as usize,
    ));

    Ok(coordinator.run().await)
}
