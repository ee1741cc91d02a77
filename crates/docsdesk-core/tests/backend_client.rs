use std::time::Duration;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use docsdesk_core::{ApiError, BackendClient};
use serde_json::{json, Value};

async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// An address nothing listens on
async fn closed_port() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

#[tokio::test]
async fn ask_decodes_answer_reference_and_score() {
    let router = Router::new().route(
        "/get-answer",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body, json!({ "query": "What is a ticket?" }));
            (
                StatusCode::CREATED,
                Json(json!({ "answer": "Hi", "top_anchor_id": "abc", "score": 0.9 })),
            )
        }),
    );
    let client = BackendClient::new(&spawn_backend(router).await).unwrap();

    let resp = client.ask("What is a ticket?").await.unwrap();
    assert_eq!(resp.answer.as_deref(), Some("Hi"));
    assert_eq!(resp.top_anchor_id.as_deref(), Some("abc"));
    assert_eq!(resp.score, Some(0.9));
}

#[tokio::test]
async fn ask_accepts_null_reference() {
    let router = Router::new().route(
        "/get-answer",
        post(|| async {
            Json(json!({
                "answer": "I don't have enough information in the provided documents.",
                "top_anchor_id": null,
                "score": null
            }))
        }),
    );
    let client = BackendClient::new(&spawn_backend(router).await).unwrap();

    let resp = client.ask("anything").await.unwrap();
    assert!(resp.top_anchor_id.is_none());
    assert!(resp.score.is_none());
}

#[tokio::test]
async fn ask_reports_non_success_status() {
    let router = Router::new().route(
        "/get-answer",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "index missing") }),
    );
    let client = BackendClient::new(&spawn_backend(router).await).unwrap();

    match client.ask("anything").await {
        Err(ApiError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "index missing");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn ask_reports_malformed_body() {
    let router = Router::new().route("/get-answer", post(|| async { "<html>oops</html>" }));
    let client = BackendClient::new(&spawn_backend(router).await).unwrap();

    let err = client.ask("anything").await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn ask_reports_transport_failure() {
    let client = BackendClient::new(&closed_port().await).unwrap();

    let err = client.ask("anything").await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
    assert!(err.to_string().starts_with("Network error: "));
}

#[tokio::test]
async fn ask_honours_timeout() {
    let router = Router::new().route(
        "/get-answer",
        post(|| async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Json(json!({ "answer": "late" }))
        }),
    );
    let base = spawn_backend(router).await;
    let client = BackendClient::with_timeout(&base, Some(Duration::from_millis(50))).unwrap();

    let err = client.ask("anything").await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn ingest_returns_message() {
    let router = Router::new().route(
        "/ingest-data",
        get(|| async { Json(json!({ "message": "Loaded 42 docs" })) }),
    );
    let client = BackendClient::new(&spawn_backend(router).await).unwrap();

    let resp = client.ingest().await.unwrap();
    assert_eq!(resp.message.as_deref(), Some("Loaded 42 docs"));
}

#[tokio::test]
async fn ingest_accepts_empty_object() {
    let router = Router::new().route("/ingest-data", get(|| async { Json(json!({})) }));
    let client = BackendClient::new(&spawn_backend(router).await).unwrap();

    let resp = client.ingest().await.unwrap();
    assert!(resp.message.is_none());
}

#[tokio::test]
async fn base_url_path_prefix_is_kept() {
    let router = Router::new().route(
        "/api/ingest-data",
        get(|| async { Json(json!({ "message": "prefixed" })) }),
    );
    let base = format!("{}/api", spawn_backend(router).await);
    let client = BackendClient::new(&base).unwrap();

    let resp = client.ingest().await.unwrap();
    assert_eq!(resp.message.as_deref(), Some("prefixed"));
}
