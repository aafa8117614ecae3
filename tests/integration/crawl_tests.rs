//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use creole::config::{Config, CrawlerConfig, StoreConfig, UserAgentConfig};
use creole::crawler::{Engine, FailureKind};
use creole::url::{normalize, storage_key, CanonicalUrl, Host, KeyScheme};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration storing pages under `store`
fn create_test_config(store: &Path, throttle_delay: u64) -> Config {
    Config {
        crawler: CrawlerConfig {
            throttle_delay,
            respect_crawl_delay: true,
            request_timeout_secs: 5,
            connect_timeout_secs: 2,
        },
        user_agent: UserAgentConfig {
            crawler_name: "Creole".to_string(),
            crawler_version: "0.1.0".to_string(),
        },
        store: StoreConfig {
            root: store.to_string_lossy().into_owned(),
            key_scheme: KeyScheme::Base64,
        },
    }
}

/// Builds an HTML page linking to each of `links`
fn page(links: &[&str]) -> String {
    let anchors: Vec<String> = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    format!("<html><body>{}</body></html>", anchors.join("\n"))
}

async fn mount_page(server: &MockServer, route: &str, links: &[&str], expected: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page(links), "text/html"))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/plain"))
        .expect(1)
        .mount(server)
        .await;
}

fn url(s: &str) -> CanonicalUrl {
    normalize(s, None).expect("Failed to parse test URL")
}

/// Directory holding a mock server's stored pages
fn host_dir(store: &Path, server: &MockServer) -> PathBuf {
    store.join(Host::of(&url(&server.uri())).authority())
}

fn is_stored(store: &Path, server: &MockServer, route: &str) -> bool {
    let key = storage_key(&url(&format!("{}{}", server.uri(), route)));
    let dir = host_dir(store, server);
    dir.join(&key).is_file() && dir.join(format!("{}.headers", key)).is_file()
}

/// Paths requested from a server, in order, without robots.txt
async fn page_requests(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| request.url.path().to_string())
        .filter(|p| p != "/robots.txt")
        .collect()
}

#[tokio::test]
async fn test_full_crawl_single_origin() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    let store = TempDir::new().unwrap();
    let base = server.uri();
    let offsite = format!("{}/d", other.uri());

    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(&server, "/", &["/b", "/c", offsite.as_str()], 1).await;
    mount_page(&server, "/b", &["/", "/c"], 1).await;
    mount_page(&server, "/c", &["/b"], 1).await;
    mount_page(&other, "/d", &[], 0).await;

    let mut engine = Engine::new(&create_test_config(store.path(), 0)).unwrap();
    let report = engine.crawl(&base).await.expect("Crawl failed");

    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.store_hits, 0);
    assert_eq!(report.total_failures(), 0);

    let history = engine.history();
    assert_eq!(history.len(), 3);
    for route in ["/", "/b", "/c"] {
        assert!(history.contains(&url(&format!("{}{}", base, route))));
        assert!(is_stored(store.path(), &server, route), "{} not stored", route);
    }
    assert!(!history.contains(&url(&offsite)));
    assert!(engine.queue().is_empty());

    // One robots.txt fetch and one rate clock for the single host
    assert_eq!(engine.fetcher().robots().fetch_count(), 1);
    assert_eq!(engine.fetcher().limiter().tracked_hosts(), 1);
    assert!(!host_dir(store.path(), &other).exists());
}

#[tokio::test]
async fn test_robots_disallowed_page_is_never_requested() {
    let server = MockServer::start().await;
    let store = TempDir::new().unwrap();

    mount_robots(&server, "User-agent: *\nDisallow: /private").await;
    mount_page(&server, "/", &["/private/report", "/public"], 1).await;
    mount_page(&server, "/private/report", &[], 0).await;
    mount_page(&server, "/public", &[], 1).await;

    let mut engine = Engine::new(&create_test_config(store.path(), 0)).unwrap();
    let report = engine.crawl(&server.uri()).await.unwrap();

    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.failure_count(FailureKind::RobotsDenied), 1);
    assert!(!is_stored(store.path(), &server, "/private/report"));
}

#[tokio::test]
async fn test_robots_for_our_agent_only() {
    let server = MockServer::start().await;
    let store = TempDir::new().unwrap();

    mount_robots(
        &server,
        "User-agent: OtherBot\nDisallow: /\n\nUser-agent: Creole\nDisallow: /drafts\n",
    )
    .await;
    mount_page(&server, "/", &["/drafts/one", "/posts/one"], 1).await;
    mount_page(&server, "/drafts/one", &[], 0).await;
    mount_page(&server, "/posts/one", &[], 1).await;

    let mut engine = Engine::new(&create_test_config(store.path(), 0)).unwrap();
    let report = engine.crawl(&server.uri()).await.unwrap();

    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.failure_count(FailureKind::RobotsDenied), 1);
}

#[tokio::test]
async fn test_second_run_is_served_from_store() {
    let server = MockServer::start().await;
    let store = TempDir::new().unwrap();
    let config = create_test_config(store.path(), 0);

    // Pages are requested once across both runs; robots.txt once per run
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("", "text/plain"))
        .expect(2)
        .mount(&server)
        .await;
    mount_page(&server, "/", &["/a", "/b"], 1).await;
    mount_page(&server, "/a", &[], 1).await;
    mount_page(&server, "/b", &["/a"], 1).await;

    let first = Engine::new(&config).unwrap().crawl(&server.uri()).await.unwrap();
    assert_eq!(first.pages_fetched, 3);
    assert_eq!(first.store_hits, 0);

    let mut engine = Engine::new(&config).unwrap();
    let second = engine.crawl(&server.uri()).await.unwrap();
    assert_eq!(second.pages_fetched, 0);
    assert_eq!(second.store_hits, 3);
    assert_eq!(engine.history().len(), 3);
    assert_eq!(engine.fetcher().robots().fetch_count(), 1);
    assert_eq!(engine.fetcher().limiter().tracked_hosts(), 0);
}

#[tokio::test]
async fn test_cross_origin_redirect_is_skipped() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    let store = TempDir::new().unwrap();

    mount_robots(&server, "").await;
    mount_page(&server, "/", &["/away", "/stay"], 1).await;
    mount_page(&server, "/stay", &[], 1).await;
    Mock::given(method("GET"))
        .and(path("/away"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("{}/landing", other.uri()).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&other, "/landing", &[], 0).await;

    let mut engine = Engine::new(&create_test_config(store.path(), 0)).unwrap();
    let report = engine.crawl(&server.uri()).await.unwrap();

    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.failure_count(FailureKind::WrongDomain), 1);
    assert!(!is_stored(store.path(), &server, "/away"));
    assert!(!host_dir(store.path(), &other).exists());
}

#[tokio::test]
async fn test_same_origin_redirect_records_both_urls() {
    let server = MockServer::start().await;
    let store = TempDir::new().unwrap();

    mount_robots(&server, "").await;
    mount_page(&server, "/", &["/old"], 1).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/new", &["/old", "/new", "/"], 1).await;

    let mut engine = Engine::new(&create_test_config(store.path(), 0)).unwrap();
    let report = engine.crawl(&server.uri()).await.unwrap();

    assert_eq!(report.pages_fetched, 2);
    assert!(engine.history().contains(&url(&format!("{}/old", server.uri()))));
    assert!(engine.history().contains(&url(&format!("{}/new", server.uri()))));
    assert!(is_stored(store.path(), &server, "/new"));
    assert!(!is_stored(store.path(), &server, "/old"));
}

#[tokio::test]
async fn test_non_text_content_is_skipped() {
    let server = MockServer::start().await;
    let store = TempDir::new().unwrap();

    mount_robots(&server, "").await;
    mount_page(&server, "/", &["/logo.png", "/about"], 1).await;
    mount_page(&server, "/about", &[], 1).await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(vec![0x89, 0x50, 0x4e, 0x47], "image/png"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut engine = Engine::new(&create_test_config(store.path(), 0)).unwrap();
    let report = engine.crawl(&server.uri()).await.unwrap();

    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.failure_count(FailureKind::WrongContentType), 1);
    assert!(!is_stored(store.path(), &server, "/logo.png"));
}

#[tokio::test]
async fn test_duplicate_spellings_are_fetched_once() {
    let server = MockServer::start().await;
    let store = TempDir::new().unwrap();
    let absolute = format!("{}/x", server.uri());

    mount_robots(&server, "").await;
    mount_page(&server, "/", &["/x", "/x#part", "./x", absolute.as_str()], 1).await;
    mount_page(&server, "/x", &[], 1).await;

    let mut engine = Engine::new(&create_test_config(store.path(), 0)).unwrap();
    let report = engine.crawl(&server.uri()).await.unwrap();

    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.links_enqueued, 1);
}

#[tokio::test]
async fn test_traversal_is_depth_first() {
    let server = MockServer::start().await;
    let store = TempDir::new().unwrap();

    mount_robots(&server, "").await;
    mount_page(&server, "/", &["/a", "/b"], 1).await;
    mount_page(&server, "/a", &["/a/1"], 1).await;
    mount_page(&server, "/a/1", &[], 1).await;
    mount_page(&server, "/b", &["/b/1"], 1).await;
    mount_page(&server, "/b/1", &[], 1).await;

    let mut engine = Engine::new(&create_test_config(store.path(), 0)).unwrap();
    engine.crawl(&server.uri()).await.unwrap();

    // The last link found is fetched first, and its children before its siblings
    assert_eq!(
        page_requests(&server).await,
        vec!["/", "/b", "/b/1", "/a", "/a/1"]
    );
}

#[tokio::test]
async fn test_failed_page_does_not_stop_crawl() {
    let server = MockServer::start().await;
    let store = TempDir::new().unwrap();

    mount_robots(&server, "").await;
    mount_page(&server, "/", &["/ok", "/broken"], 1).await;
    mount_page(&server, "/ok", &[], 1).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let mut engine = Engine::new(&create_test_config(store.path(), 0)).unwrap();
    let report = engine.crawl(&server.uri()).await.unwrap();

    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.failure_count(FailureKind::Transport), 1);
    assert!(!engine.history().contains(&url(&format!("{}/broken", server.uri()))));
}

#[tokio::test]
async fn test_requests_are_throttled() {
    let server = MockServer::start().await;
    let store = TempDir::new().unwrap();
    let delay = Duration::from_millis(150);

    mount_robots(&server, "").await;
    mount_page(&server, "/", &["/one", "/two"], 1).await;
    mount_page(&server, "/one", &[], 1).await;
    mount_page(&server, "/two", &[], 1).await;

    let config = create_test_config(store.path(), delay.as_millis() as u64);
    let mut engine = Engine::new(&config).unwrap();

    let start = Instant::now();
    let report = engine.crawl(&server.uri()).await.unwrap();

    assert_eq!(report.pages_fetched, 3);
    assert!(start.elapsed() >= delay * 2);
}

#[tokio::test]
async fn test_store_write_failure_aborts_crawl() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // A regular file where the store root should be
    let blocker = dir.path().join("store");
    std::fs::write(&blocker, b"").unwrap();

    mount_page(&server, "/", &["/next"], 1).await;
    mount_page(&server, "/next", &[], 0).await;

    let mut engine = Engine::new(&create_test_config(&blocker, 0)).unwrap();
    let result = engine.crawl(&server.uri()).await;

    assert!(matches!(result, Err(creole::CreoleError::Crawl(_))));
}

#[tokio::test]
async fn test_hashed_keys_layout() {
    let server = MockServer::start().await;
    let store = TempDir::new().unwrap();

    mount_robots(&server, "").await;
    mount_page(&server, "/", &[], 1).await;

    let mut config = create_test_config(store.path(), 0);
    config.store.key_scheme = KeyScheme::Sha256;
    Engine::new(&config).unwrap().crawl(&server.uri()).await.unwrap();

    let key = KeyScheme::Sha256.key_for(&url(&server.uri()));
    assert_eq!(key.len(), 64);
    assert!(host_dir(store.path(), &server).join(&key).is_file());
}
