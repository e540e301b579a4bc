//! Handler tests for the library event endpoints.
//!
//! These exercise the HTTP surface against an in-process recording
//! publisher: request deserialization, validation, status codes, and the
//! event kind each endpoint tags.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain_library::*;
use http_body_util::BodyExt;
use serde_json::json;
use std::sync::{Arc, Mutex};
use stream_worker::RecordMeta;
use tower::ServiceExt; // For oneshot()

/// Records published events instead of touching Redis.
#[derive(Default)]
struct RecordingPublisher {
    published: Mutex<Vec<LibraryEvent>>,
    fail: bool,
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: &LibraryEvent) -> LibraryResult<RecordMeta> {
        if self.fail {
            return Err(LibraryError::Publish("stream unavailable".to_string()));
        }
        self.published.lock().unwrap().push(event.clone());
        Ok(RecordMeta {
            partition: 0,
            stream_id: "1-0".to_string(),
        })
    }
}

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn request(method: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri("/library-event")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn book_json() -> serde_json::Value {
    json!({"id": 7, "name": "Dune", "author": "Herbert"})
}

#[tokio::test]
async fn test_post_publishes_new_event_and_returns_201() {
    let publisher = Arc::new(RecordingPublisher::default());
    let app = handlers::router(publisher.clone());

    let response = app
        .oneshot(request("POST", json!({"id": null, "book": book_json()})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let event: LibraryEvent = json_body(response.into_body()).await;
    assert_eq!(event.id, None);
    assert_eq!(event.kind, EventKind::New);

    let published = publisher.published.lock().unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].kind, EventKind::New);
}

#[tokio::test]
async fn test_put_publishes_update_event_and_returns_200() {
    let publisher = Arc::new(RecordingPublisher::default());
    let app = handlers::router(publisher.clone());

    let response = app
        .oneshot(request("PUT", json!({"id": 5, "book": book_json()})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let event: LibraryEvent = json_body(response.into_body()).await;
    assert_eq!(event.id, Some(5));
    assert_eq!(event.kind, EventKind::Update);
}

#[tokio::test]
async fn test_put_without_id_returns_400() {
    let publisher = Arc::new(RecordingPublisher::default());
    let app = handlers::router(publisher.clone());

    let response = app
        .oneshot(request("PUT", json!({"id": null, "book": book_json()})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = json_body(response.into_body()).await;
    assert_eq!(body["message"], "library event id is required");

    assert!(publisher.published.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_post_with_empty_book_name_returns_400() {
    let publisher = Arc::new(RecordingPublisher::default());
    let app = handlers::router(publisher.clone());

    let response = app
        .oneshot(request(
            "POST",
            json!({"id": null, "book": {"id": 7, "name": "", "author": "Herbert"}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(publisher.published.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_post_with_malformed_body_returns_4xx() {
    let publisher = Arc::new(RecordingPublisher::default());
    let app = handlers::router(publisher.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/library-event")
                .header("content-type", "application/json")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_publish_failure_returns_500() {
    let publisher = Arc::new(RecordingPublisher {
        fail: true,
        ..Default::default()
    });
    let app = handlers::router(publisher);

    let response = app
        .oneshot(request("POST", json!({"id": null, "book": book_json()})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
