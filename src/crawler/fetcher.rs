//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client with the crawler's user agent
//! - One GET per page with a bounded total timeout
//! - Status and Content-Type validation
//! - Following redirects only while they stay on the same site
//! - Error classification into `FetchError`
//!
//! There is no retry: a single failure is terminal for that URL.

use crate::config::UserAgentConfig;
use crate::url::is_same_domain;
use crate::{FetchError, FetchResult};
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;

/// Media type a response must declare to be treated as a page
const HTML_MEDIA_TYPE: &str = "text/html";

/// Maximum length of a redirect chain
const MAX_REDIRECTS: usize = 10;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Total time allowed for one request, body included
///
/// # Example
///
/// ```no_run
/// use site_crawler::config::UserAgentConfig;
/// use site_crawler::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .gzip(true)
        .brotli(true)
        .redirect(same_site_redirects())
        .build()
}

/// Redirect policy that refuses to leave the site of the original request
///
/// A page is recorded under the key of the URL that was requested, so a
/// redirect to another host would store an off-site page under an on-site
/// key. Such a hop fails the fetch instead.
fn same_site_redirects() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() > MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }

        let off_site = match attempt.previous().first() {
            Some(origin) => !is_same_domain(origin, attempt.url().as_str()),
            None => false,
        };

        if off_site {
            let message = format!("redirect leaves the site: {}", attempt.url());
            attempt.error(message)
        } else {
            attempt.follow()
        }
    })
}

/// Fetches a URL and returns its HTML body
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP status >= 400 | `FetchError::HttpStatus` |
/// | Content-Type without `text/html` | `FetchError::UnsupportedContentType` |
/// | Deadline exceeded | `FetchError::Timeout` |
/// | Any other transport fault | `FetchError::Network` |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
pub async fn fetch_html(client: &Client, url: &str) -> FetchResult<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if status.as_u16() >= 400 {
        return Err(FetchError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !content_type.contains(HTML_MEDIA_TYPE) {
        return Err(FetchError::UnsupportedContentType {
            url: url.to_string(),
            content_type,
        });
    }

    response.text().await.map_err(|e| classify_error(url, e))
}

/// Maps a transport error onto the fetch error taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            source: error,
        }
    }
}
