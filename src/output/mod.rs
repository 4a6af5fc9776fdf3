//! Output module for reporting crawl results
//!
//! This module handles:
//! - Building a summary of a finished crawl and printing it to the console
//! - Exporting successful pages as a CSV report

mod csv_report;
pub mod summary;

pub use csv_report::{format_csv_report, write_csv_report, CSV_HEADER};
pub use summary::{format_summary, print_summary, CrawlSummary};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Report is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
