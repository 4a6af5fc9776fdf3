//! CSV report generation
//!
//! One row per successfully fetched page, header first. Link and image lists
//! are joined with semicolons.

use crate::crawler::CrawlResult;
use crate::output::OutputResult;
use std::io::Write;
use std::path::Path;

/// Column names of the CSV report
pub const CSV_HEADER: [&str; 5] = [
    "page_url",
    "title",
    "excerpt",
    "outgoing_link_urls",
    "image_urls",
];

/// Writes the CSV report for a crawl to a file
///
/// # Returns
///
/// * `Ok(usize)` - Number of page rows written
/// * `Err(OutputError)` - Failed to create or write the file
pub fn write_csv_report(result: &CrawlResult, output_path: &Path) -> OutputResult<usize> {
    let file = std::fs::File::create(output_path)?;
    let rows = write_rows(result, file)?;
    tracing::info!(
        "CSV report written to {} ({} pages)",
        output_path.display(),
        rows
    );
    Ok(rows)
}

/// Formats the CSV report for a crawl as a string
pub fn format_csv_report(result: &CrawlResult) -> OutputResult<String> {
    let mut buffer = Vec::new();
    write_rows(result, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

fn write_rows<W: Write>(result: &CrawlResult, sink: W) -> OutputResult<usize> {
    let mut writer = csv::Writer::from_writer(sink);
    writer.write_record(CSV_HEADER)?;

    let pages = result.successful_pages();
    for (_, page) in &pages {
        let outgoing_links = page.outgoing_links.join(";");
        let image_urls = page.image_urls.join(";");
        writer.write_record([
            page.url.as_str(),
            page.title.as_str(),
            page.excerpt.as_str(),
            outgoing_links.as_str(),
            image_urls.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(pages.len())
}
