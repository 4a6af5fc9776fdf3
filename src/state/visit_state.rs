/// Visit state definitions for tracking crawl progress
///
/// A URL that has never been claimed has no state at all: it is simply
/// absent from the ledger.
use crate::crawler::PageRecord;
use std::fmt;

/// Represents the current state of a claimed page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitState {
    /// Page has been claimed by a task and has no result yet
    InFlight,

    /// Page was fetched and extracted
    Succeeded(PageRecord),

    /// Page fetch failed; holds the failure reason
    Failed(String),
}

impl VisitState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InFlight)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    /// Returns true if this represents a failed fetch
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns the extracted page record, if the visit succeeded
    pub fn record(&self) -> Option<&PageRecord> {
        match self {
            Self::Succeeded(record) => Some(record),
            _ => None,
        }
    }

    /// Short name of the state, used in logs and error messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::InFlight => "in_flight",
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InFlight => write!(f, "In flight"),
            Self::Succeeded(_) => write!(f, "Succeeded"),
            Self::Failed(reason) => write!(f, "Failed: {}", reason),
        }
    }
}
