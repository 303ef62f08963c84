//! Integration tests for the download manager, plus a crawl-then-download run

use crate::common::{coordinator, domain_of, seed, PNG};
use asset_spider::{AssetMap, DownloadManager, HttpClient, Progress, ProgressMode};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn manager(target: &Path, concurrency: usize) -> DownloadManager {
    DownloadManager::new(
        target,
        HttpClient::with_defaults().unwrap(),
        concurrency,
        Progress::hidden(ProgressMode::Files),
    )
}

async fn mount_image(server: &MockServer, image: &str, filename: &str, expected: u64) {
    Mock::given(method("GET"))
        .and(path(image))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(PNG)
                .insert_header("content-type", "image/png")
                .insert_header(
                    "content-disposition",
                    format!("attachment; filename=\"{}\"", filename).as_str(),
                ),
        )
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_duplicate_asset_downloaded_once() {
    let server = MockServer::start().await;
    mount_image(&server, "/x.jpg", "x", 1).await;

    let domain = domain_of(&server);
    let url = format!("{}/x.jpg", server.uri());
    let assets: AssetMap = vec![(domain.clone(), vec![url.clone(), url])]
        .into_iter()
        .collect();

    let temp = TempDir::new().unwrap();
    let manager = manager(temp.path(), 10);
    let summary = manager.start(&assets).await.unwrap();

    assert_eq!(summary.completed, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(manager.progress().counts().total, 1);

    // Sniffed extension appended to the bare Content-Disposition name
    let written = std::fs::read(temp.path().join(&domain).join("x.png")).unwrap();
    assert_eq!(written, PNG);
}

#[tokio::test]
async fn test_failed_download_does_not_abort_batch() {
    let server = MockServer::start().await;
    mount_image(&server, "/good.png", "good.png", 1).await;
    Mock::given(method("GET"))
        .and(path("/bad.png"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let domain = domain_of(&server);
    let assets: AssetMap = vec![(
        domain.clone(),
        vec![
            format!("{}/bad.png", server.uri()),
            format!("{}/good.png", server.uri()),
        ],
    )]
    .into_iter()
    .collect();

    let temp = TempDir::new().unwrap();
    let manager = manager(temp.path(), 1);
    let summary = manager.start(&assets).await.unwrap();

    assert_eq!(summary.completed, 1);
    assert_eq!(summary.failed, 1);
    assert!(temp.path().join(&domain).join("good.png").is_file());

    let counts = manager.progress().counts();
    assert_eq!(counts.finished(), 2);
    assert_eq!(counts.failed, 1);
}

#[tokio::test]
async fn test_existing_directory_is_reused() {
    let server = MockServer::start().await;
    mount_image(&server, "/a.png", "a.png", 1).await;

    let domain = domain_of(&server);
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join(&domain)).unwrap();

    let assets: AssetMap = vec![(domain.clone(), vec![format!("{}/a.png", server.uri())])]
        .into_iter()
        .collect();
    let summary = manager(temp.path(), 10).start(&assets).await.unwrap();

    assert_eq!(summary.completed, 1);
    assert!(temp.path().join(&domain).join("a.png").is_file());
}

#[tokio::test]
async fn test_downloads_never_exceed_cap() {
    let server = MockServer::start().await;
    let mut urls = Vec::new();
    for i in 0..12 {
        let image = format!("/img{}.png", i);
        Mock::given(method("GET"))
            .and(path(image.as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(PNG)
                    .insert_header("content-type", "image/png")
                    .insert_header(
                        "content-disposition",
                        format!("attachment; filename=\"img{}.png\"", i).as_str(),
                    )
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&server)
            .await;
        urls.push(format!("{}{}", server.uri(), image));
    }

    let domain = domain_of(&server);
    let assets: AssetMap = vec![(domain.clone(), urls)].into_iter().collect();

    let temp = TempDir::new().unwrap();
    let manager = manager(temp.path(), 3);
    let finished = AtomicBool::new(false);

    let run = async {
        let summary = manager.start(&assets).await;
        finished.store(true, Ordering::SeqCst);
        summary
    };
    let sample = async {
        let mut peak = 0;
        while !finished.load(Ordering::SeqCst) {
            peak = peak.max(manager.progress().counts().downloading);
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        peak
    };
    let (summary, peak) = tokio::join!(run, sample);

    assert_eq!(summary.unwrap().completed, 12);
    assert_eq!(peak, 3);
    let files = std::fs::read_dir(temp.path().join(&domain)).unwrap().count();
    assert_eq!(files, 12);
}

#[tokio::test]
async fn test_crawl_then_download() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/index.html"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><body>
                <img src="/cat.png">
                <a href="/more.html">More</a>
            </body></html>"#,
            "text/html",
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/more.html"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><img src="/cat.png"><img src="/dog.png"></html>"#,
            "text/html",
        ))
        .expect(1)
        .mount(&server)
        .await;
    mount_image(&server, "/cat.png", "cat.png", 1).await;
    mount_image(&server, "/dog.png", "dog.png", 1).await;

    let assets = coordinator(vec![seed(format!("{}/index.html", base), &["png"])])
        .start()
        .await
        .unwrap();
    let domain = domain_of(&server);
    assert_eq!(assets.get(&domain).unwrap().len(), 3);

    let temp = TempDir::new().unwrap();
    let summary = manager(temp.path(), 10).start(&assets).await.unwrap();

    assert_eq!(summary.completed, 2);
    assert_eq!(summary.skipped, 1);
    assert!(temp.path().join(&domain).join("cat.png").is_file());
    assert!(temp.path().join(&domain).join("dog.png").is_file());
}
