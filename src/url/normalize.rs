use url::Url;

/// Normalizes a URL into the canonical key used for deduplication
///
/// # Normalization Steps
///
/// 1. Lowercase the host
/// 2. Drop the default port (`:80` for http, `:443` for https); custom ports stay
/// 3. Remove a single trailing slash from the path
/// 4. Drop the scheme and the fragment; keep the query after the path
/// 5. Concatenate host and path (host alone when the path is empty)
///
/// This never fails. Input that `Url` cannot parse is normalized textually
/// from whatever components can be split out of it.
///
/// # Examples
///
/// ```
/// use site_crawler::url::normalize_url;
///
/// assert_eq!(normalize_url("https://A.COM:443/p/#x"), "a.com/p");
/// assert_eq!(normalize_url("https://blog.boot.dev"), "blog.boot.dev");
/// ```
pub fn normalize_url(url_str: &str) -> String {
    match Url::parse(url_str.trim()) {
        Ok(url) if url.host_str().is_some() => normalize_parsed(&url),
        _ => normalize_fallback(url_str.trim()),
    }
}

/// Normalizes an already-parsed URL
fn normalize_parsed(url: &Url) -> String {
    // `Url` already lowercases hosts and drops scheme-default ports
    let mut key = url.host_str().unwrap_or_default().to_lowercase();
    if let Some(port) = url.port() {
        key.push(':');
        key.push_str(&port.to_string());
    }

    append_path(&mut key, url.path(), url.query());
    key
}

/// Best-effort normalization for input that does not parse as a URL
fn normalize_fallback(raw: &str) -> String {
    let without_fragment = raw.split('#').next().unwrap_or_default();

    let (scheme, rest) = match without_fragment.split_once("://") {
        Some((scheme, rest)) => (scheme.to_lowercase(), rest),
        None => (String::new(), without_fragment),
    };

    let authority_end = rest.find(['/', '?']).unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(authority_end);

    let mut host = authority.to_lowercase();
    let default_port = match scheme.as_str() {
        "http" => Some(":80"),
        "https" => Some(":443"),
        _ => None,
    };
    if let Some(port) = default_port {
        if let Some(stripped) = host.strip_suffix(port) {
            host = stripped.to_string();
        }
    }

    let (path, query) = match tail.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (tail, None),
    };

    append_path(&mut host, path, query);
    host
}

/// Appends a path (minus one trailing slash) and an optional query to a key
fn append_path(key: &mut String, path: &str, query: Option<&str>) {
    let path = path.strip_suffix('/').unwrap_or(path);
    key.push_str(path);

    if let Some(query) = query {
        key.push('?');
        key.push_str(query);
    }
}
