//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use site_crawler::config::Config;
use site_crawler::crawler::{crawl, run_crawl, CrawlResult};
use site_crawler::output::format_csv_report;
use site_crawler::state::VisitState;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Extracts the canonical host key of the mock server (e.g. "127.0.0.1:12345")
fn host_key(server: &MockServer) -> String {
    let url = url::Url::parse(&server.uri()).expect("Failed to parse base URL");
    format!(
        "{}:{}",
        url.host_str().expect("Failed to extract host"),
        url.port().expect("Mock server has a port")
    )
}

/// Mounts an HTML page at the given path
async fn mount_page(server: &MockServer, page_path: &str, body: String, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body, "text/html; charset=utf-8"),
        )
        .expect(expected_hits)
        .mount(server)
        .await;
}

fn count_terminal(result: &CrawlResult) -> usize {
    result.pages.values().filter(|s| s.is_terminal()).count()
}

#[tokio::test]
async fn test_cycle_and_external_link() {
    let mock_server = MockServer::start().await;
    let host = host_key(&mock_server);

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><h1>Home</h1><p>Start here.</p>
            <a href="/b">B</a>
            <a href="https://external.test/">External</a>
            <img src="/logo.png">
        </body></html>"#
            .to_string(),
        1,
    )
    .await;

    mount_page(
        &mock_server,
        "/b",
        r#"<html><body><h1>Page B</h1><a href="/">Home</a></body></html>"#.to_string(),
        1,
    )
    .await;

    let result = crawl(&format!("{}/", mock_server.uri()), 5, 100)
        .await
        .expect("Crawl failed");

    let mut keys: Vec<_> = result.pages.keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, vec![host.clone(), format!("{}/b", host)]);
    assert!(!result.pages.contains_key("external.test"));
    assert!(!result.budget_reached);

    let home = result.pages[&host].record().expect("Home should succeed");
    assert_eq!(home.title, "Home");
    assert_eq!(home.excerpt, "Start here.");
    assert_eq!(
        home.image_urls,
        vec![format!("{}/logo.png", mock_server.uri())]
    );
    assert!(home
        .outgoing_links
        .contains(&"https://external.test/".to_string()));

    let page_b = result.pages[&format!("{}/b", host)]
        .record()
        .expect("B should succeed");
    assert_eq!(page_b.title, "Page B");
}

#[tokio::test]
async fn test_failed_page_does_not_stop_siblings() {
    let mock_server = MockServer::start().await;
    let host = host_key(&mock_server);

    mount_page(
        &mock_server,
        "/",
        r#"<html><body>
            <a href="/missing">Missing</a>
            <a href="/one">One</a>
            <a href="/two">Two</a>
        </body></html>"#
            .to_string(),
        1,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_page(&mock_server, "/one", "<h1>One</h1>".to_string(), 1).await;
    mount_page(&mock_server, "/two", "<h1>Two</h1>".to_string(), 1).await;

    let result = crawl(&mock_server.uri(), 2, 100)
        .await
        .expect("Crawl failed");

    let missing = format!("{}/missing", host);
    assert!(result.pages[&missing].is_failure());

    let failed: Vec<_> = result.failed_pages().iter().map(|p| p.0).collect();
    assert_eq!(failed, vec![missing.as_str()]);

    assert_eq!(result.successful_pages().len(), 3);
    assert!(result.pages[&format!("{}/one", host)].is_success());
    assert!(result.pages[&format!("{}/two", host)].is_success());
}

#[tokio::test]
async fn test_shared_link_fetched_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Several pages all point at /shared, with differing but equivalent URLs
    mount_page(
        &mock_server,
        "/",
        format!(
            r#"<a href="/a">A</a><a href="/b">B</a><a href="/c">C</a><a href="{}/shared">S</a>"#,
            base_url
        ),
        1,
    )
    .await;
    for page in ["/a", "/b", "/c"] {
        mount_page(
            &mock_server,
            page,
            r##"<a href="/shared/">S</a><a href="/shared#top">S</a><a href="/">Home</a>"##
                .to_string(),
            1,
        )
        .await;
    }

    // Whichever spelling wins the claim is the only one requested
    Mock::given(method("GET"))
        .and(path_regex(r"^/shared/?$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<h1>Shared</h1>", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = crawl(&base_url, 4, 100).await.expect("Crawl failed");

    assert_eq!(result.pages.len(), 5);
    assert_eq!(result.successful_pages().len(), 5);
    // Wiremock verifies every expect(1) when the server drops
}

#[tokio::test]
async fn test_budget_of_one_fetches_only_the_seed() {
    let mock_server = MockServer::start().await;
    let host = host_key(&mock_server);

    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/page{}">Page {}</a>"#, i, i))
        .collect();
    mount_page(
        &mock_server,
        "/",
        format!("<html><body>{}</body></html>", links),
        1,
    )
    .await;

    for i in 0..10 {
        mount_page(
            &mock_server,
            &format!("/page{}", i),
            "<h1>Child</h1>".to_string(),
            0, // Should never be called
        )
        .await;
    }

    let result = crawl(&mock_server.uri(), 5, 1)
        .await
        .expect("Crawl failed");

    assert_eq!(result.pages.len(), 1);
    assert_eq!(count_terminal(&result), 1);
    assert!(result.abandoned_pages().is_empty());
    assert!(result.pages[&host].is_success());
    assert!(result.budget_reached);
}

#[tokio::test]
async fn test_budget_caps_claims() {
    let mock_server = MockServer::start().await;

    let links: String = (0..20)
        .map(|i| format!(r#"<a href="/page{}">Page {}</a>"#, i, i))
        .collect();
    mount_page(&mock_server, "/", links, 1).await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<h1>Child</h1>", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let result = crawl(&mock_server.uri(), 3, 5)
        .await
        .expect("Crawl failed");

    assert!(result.budget_reached);
    assert!(result.pages.len() <= 5);
    assert!(count_terminal(&result) <= 5);
    assert!(result.successful_pages().len() >= 1);
    assert_eq!(
        count_terminal(&result) + result.abandoned_pages().len(),
        result.pages.len()
    );
}

#[tokio::test]
async fn test_off_site_pages_never_fetched() {
    let mock_server = MockServer::start().await;
    let other_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        format!(r#"<a href="{}/elsewhere">Elsewhere</a>"#, other_server.uri()),
        1,
    )
    .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0) // Different port means a different site
        .mount(&other_server)
        .await;

    let result = crawl(&mock_server.uri(), 2, 100)
        .await
        .expect("Crawl failed");

    assert_eq!(result.pages.len(), 1);
}

#[tokio::test]
async fn test_content_type_handling() {
    let mock_server = MockServer::start().await;
    let host = host_key(&mock_server);

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/data.json">Data</a><a href="/page">Page</a>"#.to_string(),
        1,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"key": "value"}"#, "application/json"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_page(&mock_server, "/page", "<p>Hello</p>".to_string(), 1).await;

    let result = crawl(&mock_server.uri(), 5, 100)
        .await
        .expect("Crawl failed");

    match &result.pages[&format!("{}/data.json", host)] {
        VisitState::Failed(reason) => assert!(reason.contains("application/json")),
        other => panic!("Expected failure for JSON page, got {:?}", other),
    }
    assert!(result.pages[&format!("{}/page", host)].is_success());
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let mock_server = MockServer::start().await;
    let host = host_key(&mock_server);

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/slow">Slow</a><a href="/fast">Fast</a>"#.to_string(),
        1,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<h1>Slow</h1>", "text/html")
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    mount_page(&mock_server, "/fast", "<h1>Fast</h1>".to_string(), 1).await;

    let mut config = Config::default();
    config.crawler.request_timeout_secs = 1;

    let result = run_crawl(&config, &mock_server.uri())
        .await
        .expect("Crawl failed");

    match &result.pages[&format!("{}/slow", host)] {
        VisitState::Failed(reason) => assert!(reason.contains("timeout")),
        other => panic!("Expected timeout failure, got {:?}", other),
    }
    assert!(result.pages[&format!("{}/fast", host)].is_success());
}

#[tokio::test]
async fn test_single_slot_crawls_everything() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/a">A</a><a href="/b">B</a>"#.to_string(),
        1,
    )
    .await;
    mount_page(&mock_server, "/a", r#"<a href="/a/deep">D</a>"#.to_string(), 1).await;
    mount_page(&mock_server, "/b", "<p>B</p>".to_string(), 1).await;
    mount_page(&mock_server, "/a/deep", "<p>Deep</p>".to_string(), 1).await;

    let result = crawl(&mock_server.uri(), 1, 100)
        .await
        .expect("Crawl failed");

    assert_eq!(result.successful_pages().len(), 4);
    assert!(result.abandoned_pages().is_empty());
}

#[tokio::test]
async fn test_concurrency_above_page_count_is_accepted() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/a">A</a><a href="/b">B</a>"#.to_string(),
        1,
    )
    .await;
    mount_page(&mock_server, "/a", "<p>A</p>".to_string(), 1).await;
    mount_page(&mock_server, "/b", "<p>B</p>".to_string(), 1).await;

    let result = crawl(&mock_server.uri(), 250, 100)
        .await
        .expect("Large concurrency should be accepted");

    assert_eq!(result.successful_pages().len(), 3);
}

#[tokio::test]
async fn test_csv_report_from_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<h1>Home</h1><p>Intro</p><a href="/next">Next</a><img src="/a.png"><img src="/b.png">"#
            .to_string(),
        1,
    )
    .await;
    mount_page(&mock_server, "/next", "<h1>Next</h1>".to_string(), 1).await;

    let result = crawl(&base_url, 2, 100).await.expect("Crawl failed");
    let csv = format_csv_report(&result).expect("CSV formatting failed");
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "page_url,title,excerpt,outgoing_link_urls,image_urls"
    );
    assert_eq!(
        lines[1],
        format!(
            "{}/,Home,Intro,{}/next,{}/a.png;{}/b.png",
            base_url, base_url, base_url, base_url
        )
    );
    assert_eq!(lines[2], format!("{}/next,Next,,,", base_url));
}

#[tokio::test]
async fn test_invalid_seed_rejected_before_crawling() {
    let result = crawl("definitely not a url", 5, 100).await;
    assert!(result.is_err());
}
