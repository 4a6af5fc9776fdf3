//! State module for tracking crawl progress
//!
//! `VisitState` tracks each claimed page from the moment a task claims it
//! until its fetch either succeeds or fails.

mod visit_state;

// Re-export main types
pub use visit_state::VisitState;
