//! Behavior of the retrying JSON fetch wrapper against live stub endpoints.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use obs_api::fetch::{FetchClient, FetchOptions};
use obs_common::ObsError;

// ============================================================================
// Test scaffolding
// ============================================================================

async fn spawn_router(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve stub");
    });
    addr
}

fn client() -> FetchClient {
    FetchClient::new("obs-api-tests (dev@example.com)").expect("build client")
}

fn options(retries: u32) -> FetchOptions {
    FetchOptions::new("test", Duration::from_secs(2), retries)
}

/// Router whose `/obs` endpoint fails the first `fail_first` hits with a 500,
/// then serves JSON. The shared counter records every hit.
fn flaky_router(hits: Arc<AtomicUsize>, fail_first: usize) -> Router {
    Router::new().route(
        "/obs",
        get(move || {
            let hits = hits.clone();
            async move {
                let n = hits.fetch_add(1, Ordering::SeqCst);
                if n < fail_first {
                    (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
                } else {
                    Json(json!({"attempt": n + 1})).into_response()
                }
            }
        }),
    )
}

// ============================================================================
// Happy path and error classification
// ============================================================================

#[tokio::test]
async fn test_fetch_json_returns_parsed_body() {
    let addr = spawn_router(Router::new().route("/obs", get(|| async { Json(json!({"v": 1})) }))).await;

    let value = client()
        .fetch_json(&format!("http://{addr}/obs"), &options(0))
        .await
        .expect("fetch");
    assert_eq!(value["v"], 1);
}

#[tokio::test]
async fn test_http_error_carries_status_and_snippet() {
    let addr = spawn_router(Router::new().route(
        "/obs",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "upstream melted") }),
    ))
    .await;

    let err = client()
        .fetch_json(&format!("http://{addr}/obs"), &options(0))
        .await
        .expect_err("should fail");
    match err {
        ObsError::UpstreamHttp { status, url, body_snippet, .. } => {
            assert_eq!(status, 503);
            assert!(url.ends_with("/obs"));
            assert!(body_snippet.contains("upstream melted"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_body_is_format_error() {
    let addr = spawn_router(Router::new().route("/obs", get(|| async { "<html>not json</html>" }))).await;

    let err = client()
        .fetch_json(&format!("http://{addr}/obs"), &options(0))
        .await
        .expect_err("should fail");
    match err {
        ObsError::UpstreamFormat { body_snippet, .. } => {
            assert!(body_snippet.contains("<html>"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let addr = spawn_router(Router::new().route(
        "/obs",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"too": "late"}))
        }),
    ))
    .await;

    let started = Instant::now();
    let err = client()
        .fetch_json(
            &format!("http://{addr}/obs"),
            &FetchOptions::new("test", Duration::from_millis(200), 0),
        )
        .await
        .expect_err("should time out");
    assert!(matches!(err, ObsError::UpstreamNetwork { .. }));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_refused_connection_is_network_error() {
    // Nothing listens on the discard port.
    let err = client()
        .fetch_json("http://127.0.0.1:9/none", &options(0))
        .await
        .expect_err("should fail");
    assert!(matches!(err, ObsError::UpstreamNetwork { .. }));
}

// ============================================================================
// Retry budget
// ============================================================================

#[tokio::test]
async fn test_one_retry_recovers_from_transient_failure() {
    let hits = Arc::new(AtomicUsize::new(0));
    let addr = spawn_router(flaky_router(hits.clone(), 1)).await;

    let started = Instant::now();
    let value = client()
        .fetch_json(&format!("http://{addr}/obs"), &options(1))
        .await
        .expect("second attempt succeeds");

    assert_eq!(value["attempt"], 2);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    // One failed attempt means one 500 ms backoff before the retry.
    assert!(started.elapsed() >= Duration::from_millis(500));
}

#[tokio::test]
async fn test_zero_retries_propagates_first_failure() {
    let hits = Arc::new(AtomicUsize::new(0));
    let addr = spawn_router(flaky_router(hits.clone(), 1)).await;

    let err = client()
        .fetch_json(&format!("http://{addr}/obs"), &options(0))
        .await
        .expect_err("should fail");

    assert!(matches!(err, ObsError::UpstreamHttp { status: 500, .. }));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_exhausted_budget_returns_last_error_after_linear_backoff() {
    let hits = Arc::new(AtomicUsize::new(0));
    let addr = spawn_router(flaky_router(hits.clone(), usize::MAX)).await;

    let started = Instant::now();
    let err = client()
        .fetch_json(&format!("http://{addr}/obs"), &options(2))
        .await
        .expect_err("should exhaust retries");

    assert!(matches!(err, ObsError::UpstreamHttp { status: 500, .. }));
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    // Backoff grows with the attempt number: 500 ms, then 1000 ms.
    assert!(started.elapsed() >= Duration::from_millis(1500));
}
