//! Site-Crawler: a concurrent single-site web crawler
//!
//! This crate crawls one website from a seed URL, follows same-domain links
//! with a bounded number of concurrent fetches, extracts a small record from
//! every page and reports the results on the console or as CSV.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid visit transition for {url}: {from} -> {to}")]
    InvalidTransition {
        url: String,
        from: &'static str,
        to: &'static str,
    },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Per-page fetch failures
///
/// None of these abort a crawl: the page is recorded as failed and its
/// siblings carry on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Invalid content type for {url}: '{content_type}', expected text/html")]
    UnsupportedContentType { url: String, content_type: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Request failed for {url}: {source}")]
    Network { url: String, source: reqwest::Error },
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CrawlResult, PageRecord};
pub use state::VisitState;
pub use crate::url::{extract_domain, is_same_domain, normalize_url};
