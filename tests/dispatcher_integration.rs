//! Integration tests for link checks and downloads.
//!
//! These tests drive the full extraction, resolution, and dispatch flow
//! against mock HTTP servers.

mod support;
use support::socket_guard::start_mock_server_or_skip;
use support::truncated_server::start_truncated_server_or_skip;

use std::collections::HashMap;
use std::path::Path;

use pdf_link_fetcher::{
    CheckState, DownloadState, FetchConfig, FetchDispatcher, HttpClient, InputRecord, LinkRecord,
    extract_links,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn dispatcher(output_dir: &Path) -> FetchDispatcher {
    let config = FetchConfig::default().with_output_dir(output_dir);
    let client = HttpClient::new(&config).expect("client should build");
    FetchDispatcher::new(client, &config).expect("config should be valid")
}

fn records<S: AsRef<str>>(links: &[S]) -> Vec<InputRecord> {
    vec![InputRecord::from(LinkRecord::with_links(
        links.iter().map(|link| link.as_ref().to_string()),
    ))]
}

/// Mounts HEAD and GET handlers serving `body` at `route`.
async fn mount_pdf(server: &MockServer, route: &str, body: &[u8]) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_check_reports_ok_and_failed_per_link() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    Mock::given(method("HEAD"))
        .and(path("/live.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/missing.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let live = format!("{}/live.pdf", mock_server.uri());
    let missing = format!("{}/missing.pdf", mock_server.uri());
    let urls = extract_links(&records(&[&live, &missing]));

    let results = dispatcher(temp_dir.path()).check_links(&urls).await;
    assert_eq!(results.len(), 2);

    let by_url: HashMap<&str, _> = results.iter().map(|r| (r.url(), r)).collect();
    let ok = by_url[live.as_str()];
    assert_eq!(ok.status(), CheckState::Ok);
    assert_eq!(ok.status_code(), Some(200));
    assert_eq!(ok.error_message(), None);

    let failed = by_url[missing.as_str()];
    assert_eq!(failed.status(), CheckState::Failed);
    assert_eq!(failed.status_code(), Some(404));
    assert_eq!(failed.error_message(), Some("HTTP status code: 404"));
}

#[tokio::test]
async fn test_check_duplicate_links_produce_one_record() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    Mock::given(method("HEAD"))
        .and(path("/a.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/a.pdf", mock_server.uri());
    let input = vec![
        InputRecord::from(LinkRecord::with_links([url.clone(), url.clone()])),
        InputRecord::from(LinkRecord::with_links([url.clone()])),
    ];
    let urls = extract_links(&input);

    let results = dispatcher(temp_dir.path()).check_links(&urls).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url(), url);
}

#[tokio::test]
async fn test_check_connection_refused_is_request_error() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    // Bind then drop a listener to get a port with nothing behind it.
    let port = {
        let Ok(listener) = std::net::TcpListener::bind("127.0.0.1:0") else {
            return;
        };
        listener.local_addr().expect("bound listener has address").port()
    };
    let url = format!("http://127.0.0.1:{port}/a.pdf");

    let results = dispatcher(temp_dir.path())
        .check_links(&extract_links(&records(&[&url])))
        .await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status(), CheckState::Failed);
    assert_eq!(results[0].status_code(), None);
    let message = results[0].error_message().expect("failure has message");
    assert!(message.starts_with("Request error: "), "got {message}");
}

#[tokio::test]
async fn test_download_writes_file_with_generated_name() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let output_dir = temp_dir.path().join("nested").join("out");

    let content = b"%PDF-1.4\nthe complete document body\n%%EOF";
    mount_pdf(&mock_server, "/papers/report", content).await;

    let url = format!("{}/papers/report", mock_server.uri());
    let results = dispatcher(&output_dir)
        .download_links(&extract_links(&records(&[&url])))
        .await;

    assert_eq!(results.len(), 1);
    let status = &results[0];
    assert_eq!(status.status(), DownloadState::Downloaded);
    assert_eq!(status.error_message(), None);

    let expected = output_dir.join("report.pdf");
    assert_eq!(status.file_path(), Some(expected.display().to_string().as_str()));
    assert_eq!(std::fs::read(&expected).expect("file exists"), content);
}

#[tokio::test]
async fn test_download_forbidden_is_failed_check_without_file() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    Mock::given(method("HEAD"))
        .and(path("/locked.pdf"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/locked.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"never".to_vec()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let url = format!("{}/locked.pdf", mock_server.uri());
    let results = dispatcher(temp_dir.path())
        .download_links(&extract_links(&records(&[&url])))
        .await;

    assert_eq!(results[0].status(), DownloadState::FailedCheck);
    assert_eq!(results[0].file_path(), None);
    assert_eq!(results[0].error_message(), Some("HTTP error: 403"));
    assert!(!temp_dir.path().join("locked.pdf").exists());
}

#[tokio::test]
async fn test_download_get_failure_after_head_ok_is_failed_check() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    Mock::given(method("HEAD"))
        .and(path("/flaky.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky.pdf"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let url = format!("{}/flaky.pdf", mock_server.uri());
    let results = dispatcher(temp_dir.path())
        .download_links(&extract_links(&records(&[&url])))
        .await;

    assert_eq!(results[0].status(), DownloadState::FailedCheck);
    assert_eq!(results[0].error_message(), Some("HTTP error: 500"));
    assert!(!temp_dir.path().join("flaky.pdf").exists());
}

#[tokio::test]
async fn test_truncated_download_keeps_same_named_sibling() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let Some(truncated) = start_truncated_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    mount_pdf(&mock_server, "/a/doc.pdf", b"complete document").await;

    let complete = format!("{}/a/doc.pdf", mock_server.uri());
    let cut = format!("{truncated}/b/doc.pdf");
    let config = FetchConfig::default()
        .with_output_dir(temp_dir.path())
        .with_concurrency(1);
    let client = HttpClient::new(&config).expect("client should build");
    let dispatcher = FetchDispatcher::new(client, &config).expect("config should be valid");

    let results = dispatcher
        .download_links(&extract_links(&records(&[&complete, &cut])))
        .await;
    assert_eq!(results.len(), 2);

    let by_url: HashMap<&str, _> = results.iter().map(|r| (r.url(), r)).collect();
    assert_eq!(by_url[complete.as_str()].status(), DownloadState::Downloaded);
    let failed = by_url[cut.as_str()];
    assert_eq!(failed.status(), DownloadState::FailedCheck);
    assert_eq!(failed.error_message(), Some("Request error: ReadError"));

    // Whichever link ran last, the finished file survives intact.
    let saved = temp_dir.path().join("doc.pdf");
    assert_eq!(
        std::fs::read(saved).expect("file exists"),
        b"complete document"
    );
    let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path())
        .expect("dir is readable")
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".part"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_viewer_link_is_fetched_resolved_but_reported_original() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    mount_pdf(&mock_server, "/docs/guide.pdf", b"guide").await;

    let viewer = format!(
        "{}/pdfjs/web/viewer.html?file=/docs/guide.pdf",
        mock_server.uri()
    );
    let results = dispatcher(temp_dir.path())
        .download_links(&extract_links(&records(&[&viewer])))
        .await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url(), viewer);
    assert_eq!(results[0].status(), DownloadState::Downloaded);
    let saved = temp_dir.path().join("guide.pdf");
    assert_eq!(std::fs::read(saved).expect("file exists"), b"guide");
}

#[tokio::test]
async fn test_one_failure_does_not_affect_other_links() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    mount_pdf(&mock_server, "/one.pdf", b"one").await;
    mount_pdf(&mock_server, "/two.pdf", b"two").await;
    Mock::given(method("HEAD"))
        .and(path("/bad.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let links: Vec<String> = ["one", "two", "bad"]
        .iter()
        .map(|name| format!("{}/{name}.pdf", mock_server.uri()))
        .collect();
    let results = dispatcher(temp_dir.path())
        .download_links(&extract_links(&records(&links)))
        .await;
    assert_eq!(results.len(), 3);
    assert_eq!(results.iter().filter(|r| r.is_downloaded()).count(), 2);
    assert_eq!(
        results
            .iter()
            .filter(|r| r.status() == DownloadState::FailedCheck)
            .count(),
        1
    );
}

#[tokio::test]
async fn test_non_http_links_are_never_fetched() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let urls = extract_links(&records(&["ftp://example.com/a.pdf", "", "mailto:x@y.z"]));
    assert!(urls.is_empty());

    let dispatcher = dispatcher(&temp_dir.path().join("out"));
    assert!(dispatcher.check_links(&urls).await.is_empty());
    assert!(dispatcher.download_links(&urls).await.is_empty());
    assert!(!temp_dir.path().join("out").exists());
}
