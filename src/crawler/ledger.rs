//! Visit ledger: the single shared record of every claimed page
//!
//! All operations take one mutex for their whole duration. The lock is never
//! held across an `.await`, so a `std::sync::Mutex` is enough.

use crate::crawler::work::OutstandingWork;
use crate::state::VisitState;
use crate::CrawlerError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Result of trying to claim a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The caller now owns the page and must fetch and record it
    Claimed,

    /// The page is already claimed, or the crawl is stopping
    AlreadyVisited,

    /// This claim hit the page budget and moved the crawl into stopping state
    BudgetExhausted,
}

/// Lock-guarded map from canonical URL to visit state
#[derive(Debug)]
pub struct VisitLedger {
    entries: Mutex<HashMap<String, VisitState>>,
    max_pages: usize,
    work: Arc<OutstandingWork>,
}

impl VisitLedger {
    /// Creates an empty ledger with a page budget
    ///
    /// Reaching the budget cancels `work`.
    pub fn new(max_pages: usize, work: Arc<OutstandingWork>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_pages,
            work,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, VisitState>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically claims a page for fetching
    ///
    /// At most one caller ever receives `Claimed` for a given key. The check
    /// and the insert happen under the same lock acquisition.
    pub fn claim(&self, key: &str) -> ClaimOutcome {
        let mut entries = self.lock();

        if self.work.is_cancelled() || entries.contains_key(key) {
            return ClaimOutcome::AlreadyVisited;
        }

        if entries.len() >= self.max_pages {
            self.work.cancel_all();
            return ClaimOutcome::BudgetExhausted;
        }

        entries.insert(key.to_string(), VisitState::InFlight);
        ClaimOutcome::Claimed
    }

    /// Records the final state of a claimed page
    ///
    /// Only an `InFlight` entry may be overwritten, and only with a terminal
    /// state. Anything else means a task recorded a page it never claimed.
    pub fn record(&self, key: &str, outcome: VisitState) -> crate::Result<()> {
        let mut entries = self.lock();

        match entries.get_mut(key) {
            Some(state) if matches!(state, VisitState::InFlight) && outcome.is_terminal() => {
                *state = outcome;
                Ok(())
            }
            Some(state) => Err(CrawlerError::InvalidTransition {
                url: key.to_string(),
                from: state.label(),
                to: outcome.label(),
            }),
            None => Err(CrawlerError::InvalidTransition {
                url: key.to_string(),
                from: "unclaimed",
                to: outcome.label(),
            }),
        }
    }

    /// Returns a copy of the full ledger
    pub fn snapshot(&self) -> HashMap<String, VisitState> {
        self.lock().clone()
    }

    /// Number of pages claimed so far (in flight and terminal)
    pub fn claimed(&self) -> usize {
        self.lock().len()
    }

    /// Returns true once the page budget has been reached
    pub fn is_stopping(&self) -> bool {
        self.work.is_cancelled()
    }

    /// The configured page budget
    pub fn max_pages(&self) -> usize {
        self.max_pages
    }
}
