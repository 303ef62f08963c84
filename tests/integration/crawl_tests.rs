//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use crate::common::{
    coordinator, coordinator_with, coordinator_with_render_cap, domain_of, seed, sorted,
};
use asset_spider::browser::{PageRenderer, RenderError};
use asset_spider::ProgressStatus;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts an HTML page that must be fetched exactly once
async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"))
        .expect(1)
        .mount(server)
        .await;
}

/// Renderer returning canned HTML and recording the URLs it was asked for
struct RecordingRenderer {
    html: Option<String>,
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl RecordingRenderer {
    fn returning(html: &str) -> Self {
        Self {
            html: Some(html.to_string()),
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            html: None,
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PageRenderer for RecordingRenderer {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn render(&self, url: &str) -> Result<String, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().await.push(url.to_string());
        self.html.clone().ok_or_else(|| RenderError::Navigation {
            url: url.to_string(),
            reason: "browser crashed".to_string(),
        })
    }
}

/// Renderer that records how many renders overlap
#[derive(Default)]
struct GaugeRenderer {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl PageRenderer for GaugeRenderer {
    fn name(&self) -> &'static str {
        "gauge"
    }

    async fn render(&self, _url: &str) -> Result<String, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok("<html><body></body></html>".to_string())
    }
}

#[tokio::test]
async fn test_gallery_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/index.html",
        r#"<!DOCTYPE html><html><body>
            <a href="/gallery.html">Gallery</a>
            <img src="photo1.jpg">
        </body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/gallery.html",
        r#"<html><body>
            <a href="/index.html">Home</a>
            <img src="photo2.jpg">
        </body></html>"#,
    )
    .await;

    let coordinator = coordinator(vec![seed(format!("{}/index.html", base), &["jpg"])]);
    let outcome = coordinator.run().await.unwrap();

    let domain = domain_of(&server);
    assert_eq!(outcome.assets.len(), 1);
    assert_eq!(
        sorted(outcome.assets.get(&domain).unwrap()),
        vec![format!("{}/photo1.jpg", base), format!("{}/photo2.jpg", base)]
    );
    assert_eq!(outcome.visited.len(), 2);

    let counts = coordinator.progress().counts();
    assert_eq!(counts.total, 2);
    assert_eq!(counts.done, 2);
}

#[tokio::test]
async fn test_missing_seed_is_failed_but_run_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.html"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let coordinator = coordinator(vec![seed(format!("{}/missing.html", server.uri()), &["jpg"])]);
    let assets = coordinator.start().await.unwrap();

    assert!(!assets.contains_domain(&domain_of(&server)));
    let entries = coordinator.progress().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status(), ProgressStatus::Failed);
}

#[tokio::test]
async fn test_failed_branch_does_not_stop_siblings() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/index.html",
        r#"<html><body>
            <a href="/broken.html">Broken</a>
            <a href="/ok.html">Ok</a>
        </body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken.html"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/ok.html", r#"<html><img src="/ok.jpg"></html>"#).await;

    let coordinator = coordinator(vec![seed(format!("{}/index.html", base), &["jpg"])]);
    let assets = coordinator.start().await.unwrap();

    assert_eq!(
        assets.get(&domain_of(&server)).unwrap(),
        vec![format!("{}/ok.jpg", base)]
    );
    let counts = coordinator.progress().counts();
    assert_eq!(counts.failed, 1);
    assert_eq!(counts.done, 2);
}

#[tokio::test]
async fn test_other_domains_are_not_followed() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;

    mount_page(
        &server,
        "/index.html",
        &format!(
            r#"<html><body>
                <a href="{0}/elsewhere.html">Elsewhere</a>
                <a href="{0}/elsewhere.html">Again</a>
                <img src="/local.png">
                <img src="{0}/remote.png">
            </body></html>"#,
            other.uri()
        ),
    )
    .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
        .expect(0)
        .mount(&other)
        .await;

    let coordinator = coordinator(vec![seed(format!("{}/index.html", server.uri()), &["png"])]);
    let outcome = coordinator.run().await.unwrap();

    // Asset URLs are collected wherever they point, pages are only followed on-domain
    let assets = outcome.assets.get(&domain_of(&server)).unwrap();
    assert_eq!(assets.len(), 2);
    assert!(!outcome.assets.contains_domain(&domain_of(&other)));
    assert_eq!(outcome.visited.len(), 1);
}

#[tokio::test]
async fn test_shared_link_fetched_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/index.html",
        r#"<html><a href="/a.html">A</a><a href="/b.html">B</a></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/a.html",
        r#"<html><a href="/shared.html">S</a><a href="/index.html">Home</a></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/b.html",
        r#"<html><a href="/shared.html#top">S</a><a href="/a.html">A</a></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/shared.html",
        r#"<html><img src="/shared.gif"></html>"#,
    )
    .await;

    let coordinator = coordinator(vec![
        seed(format!("{}/index.html", base), &["gif"]),
        seed(format!("{}/index.html", base), &["gif"]),
    ]);
    let outcome = coordinator.run().await.unwrap();

    assert_eq!(outcome.visited.len(), 4);
    assert_eq!(
        outcome.assets.get(&domain_of(&server)).unwrap(),
        vec![format!("{}/shared.gif", base)]
    );
}

#[tokio::test]
async fn test_render_fallback_for_empty_page() {
    let server = MockServer::start().await;
    let base = server.uri();
    let url = format!("{}/app.html", base);

    mount_page(
        &server,
        "/app.html",
        r#"<html><body><div id="root"></div><script src="/bundle.js"></script></body></html>"#,
    )
    .await;

    let renderer = Arc::new(RecordingRenderer::returning(
        r#"<html><body><div id="root"><img src="/late.jpg"></div></body></html>"#,
    ));
    let coordinator = coordinator_with(vec![seed(url.clone(), &["jpg"])], renderer.clone());
    let assets = coordinator.start().await.unwrap();

    assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(*renderer.urls.lock().await, vec![url]);
    assert_eq!(
        assets.get(&domain_of(&server)).unwrap(),
        vec![format!("{}/late.jpg", base)]
    );
    // One fetch entry plus one render entry
    assert_eq!(coordinator.progress().counts().done, 2);
}

#[tokio::test]
async fn test_no_fallback_when_static_matches_exist() {
    let server = MockServer::start().await;
    mount_page(&server, "/page.html", r#"<html><img src="/a.jpg"></html>"#).await;

    let renderer = Arc::new(RecordingRenderer::returning("<html></html>"));
    let coordinator = coordinator_with(
        vec![seed(format!("{}/page.html", server.uri()), &["jpg"])],
        renderer.clone(),
    );
    coordinator.start().await.unwrap();

    assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_renderer_failure_is_absorbed() {
    let server = MockServer::start().await;
    mount_page(&server, "/app.html", "<html><body></body></html>").await;

    let renderer = Arc::new(RecordingRenderer::failing());
    let coordinator = coordinator_with(
        vec![seed(format!("{}/app.html", server.uri()), &["jpg"])],
        renderer.clone(),
    );
    let assets = coordinator.start().await.unwrap();

    assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(assets.get(&domain_of(&server)), Some(vec![]));
    assert_eq!(coordinator.progress().counts().failed, 0);
}

#[tokio::test]
async fn test_non_html_seed_is_scanned_but_not_parsed() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/feed.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"items":[{"href":"/next.html","media":"https:\/\/cdn.test\/v.mp4"}]}"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let coordinator = coordinator(vec![seed(format!("{}/feed.json", base), &["mp4"])]);
    let outcome = coordinator.run().await.unwrap();

    assert_eq!(outcome.visited.len(), 1);
    assert_eq!(
        outcome.assets.get(&domain_of(&server)).unwrap(),
        vec!["https://cdn.test/v.mp4".to_string()]
    );
}

#[tokio::test]
async fn test_bare_host_seed_and_root_link_fetched_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/">Home</a><img src="/a.jpg"></body></html>"#,
    )
    .await;

    // `server.uri()` has no trailing slash
    let coordinator = coordinator(vec![seed(base.clone(), &["jpg"])]);
    let outcome = coordinator.run().await.unwrap();

    assert_eq!(outcome.visited.to_sorted_vec(), vec![format!("{}/", base)]);
    assert_eq!(
        outcome.assets.get(&domain_of(&server)).unwrap(),
        vec![format!("{}/a.jpg", base)]
    );
}

#[tokio::test]
async fn test_renders_never_exceed_cap() {
    let server = MockServer::start().await;
    let base = server.uri();

    let links: String = (0..6)
        .map(|i| format!(r#"<a href="/p{}.html">{}</a>"#, i, i))
        .collect();
    mount_page(&server, "/index.html", &format!("<html><body>{}</body></html>", links)).await;
    for i in 0..6 {
        mount_page(&server, &format!("/p{}.html", i), "<html><body></body></html>").await;
    }

    let renderer = Arc::new(GaugeRenderer::default());
    let coordinator = coordinator_with_render_cap(
        vec![seed(format!("{}/index.html", base), &["jpg"])],
        renderer.clone(),
        2,
    );
    coordinator.start().await.unwrap();

    // Six children plus the index page itself
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 7);
    assert_eq!(renderer.peak.load(Ordering::SeqCst), 2);
    assert_eq!(renderer.in_flight.load(Ordering::SeqCst), 0);
}
