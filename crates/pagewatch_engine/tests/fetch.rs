mod common;

use std::sync::Arc;
use std::time::Duration;

use common::init_logging;
use pagewatch_engine::{
    FailureKind, FetchPipeline, FetchSettings, Fetcher, HtmlTextExtractor, ReqwestFetcher,
};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(settings: FetchSettings) -> Arc<ReqwestFetcher> {
    Arc::new(ReqwestFetcher::new(settings).expect("client"))
}

#[tokio::test]
async fn fetcher_returns_body_and_metadata() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>ok</html>", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let url = format!("{}/doc", server.uri());
    let output = fetcher(FetchSettings::default())
        .fetch(&url)
        .await
        .expect("fetch ok");

    assert_eq!(output.metadata.original_url, url);
    assert_eq!(output.metadata.final_url, url);
    assert_eq!(output.metadata.status, 200);
    assert!(output
        .metadata
        .content_type
        .unwrap()
        .starts_with("text/html"));
    assert_eq!(output.bytes, b"<html>ok</html>");
}

#[tokio::test]
async fn error_status_pages_are_content() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_raw(
            "<html><body><p>Not here yet</p></body></html>",
            "text/html",
        ))
        .mount(&server)
        .await;

    let pipeline = FetchPipeline::new(
        fetcher(FetchSettings::default()),
        Arc::new(HtmlTextExtractor),
        Duration::from_secs(5),
    );
    let url = format!("{}/missing", server.uri());
    let text = pipeline
        .fetch_text(&url, &CancellationToken::new())
        .await
        .expect("404 page is still text");
    assert_eq!(text, "Not here yet");
}

#[tokio::test]
async fn malformed_url_is_rejected() {
    init_logging();
    let err = fetcher(FetchSettings::default())
        .fetch("not a url")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    init_logging();
    let server = MockServer::start().await;
    let url = format!("{}/gone", server.uri());
    drop(server);

    let err = fetcher(FetchSettings::default())
        .fetch(&url)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Network);
}

#[tokio::test]
async fn pipeline_times_out_on_slow_response() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(500))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let pipeline = FetchPipeline::new(
        fetcher(FetchSettings::default()),
        Arc::new(HtmlTextExtractor),
        Duration::from_millis(50),
    );
    let url = format!("{}/slow", server.uri());
    let err = pipeline
        .fetch_text(&url, &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn pipeline_stops_when_cancelled() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let pipeline = FetchPipeline::new(
        fetcher(FetchSettings::default()),
        Arc::new(HtmlTextExtractor),
        Duration::ZERO,
    );
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let url = format!("{}/slow", server.uri());
    let err = pipeline.fetch_text(&url, &cancel).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Cancelled);
}

#[tokio::test]
async fn fetcher_rejects_too_large_response() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/html")
                .set_body_string("01234567890"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 10,
        ..FetchSettings::default()
    };
    let url = format!("{}/large", server.uri());
    let err = fetcher(settings).fetch(&url).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}
