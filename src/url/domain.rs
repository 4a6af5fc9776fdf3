use url::Url;

/// Extracts the domain from a URL
///
/// The domain is the lowercase host followed by `:port` when the URL carries
/// a port that is not the default for its scheme. Two pages belong to the
/// same site exactly when their domains are equal.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_crawler::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(extract_domain(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Returns true if `candidate` is on the same domain as `seed`
///
/// Candidates that fail to parse or have no host are never same-domain.
pub fn is_same_domain(seed: &Url, candidate: &str) -> bool {
    let Ok(candidate) = Url::parse(candidate) else {
        return false;
    };

    match (extract_domain(seed), extract_domain(&candidate)) {
        (Some(seed_domain), Some(candidate_domain)) => seed_domain == candidate_domain,
        _ => false,
    }
}
