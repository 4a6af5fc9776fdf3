//! URL handling module
//!
//! This module provides canonical-key normalization for deduplication and the
//! domain helpers used to keep a crawl on its seed's site.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, is_same_domain};
pub use normalize::normalize_url;
