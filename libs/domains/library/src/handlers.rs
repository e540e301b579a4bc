//! HTTP handlers for the producer API.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use std::sync::Arc;
use tracing::info;

use crate::error::{LibraryError, LibraryResult};
use crate::extract::ValidatedJson;
use crate::models::{EventKind, LibraryEventRequest};
use crate::publisher::EventPublisher;

/// Build the library event router.
///
/// Mounts:
/// - `POST /library-event`: publish a `NEW` event (201)
/// - `PUT /library-event`: publish an `UPDATE` event, id required (200)
pub fn router(publisher: Arc<dyn EventPublisher>) -> Router {
    Router::new()
        .route(
            "/library-event",
            post(create_library_event).put(update_library_event),
        )
        .with_state(publisher)
}

async fn create_library_event(
    State(publisher): State<Arc<dyn EventPublisher>>,
    ValidatedJson(request): ValidatedJson<LibraryEventRequest>,
) -> LibraryResult<impl IntoResponse> {
    let event = request.into_event(EventKind::New);

    let meta = publisher.publish(&event).await?;

    info!(
        event_id = ?event.id,
        partition = meta.partition,
        "Accepted new library event"
    );
    Ok((StatusCode::CREATED, Json(event)))
}

async fn update_library_event(
    State(publisher): State<Arc<dyn EventPublisher>>,
    ValidatedJson(request): ValidatedJson<LibraryEventRequest>,
) -> LibraryResult<impl IntoResponse> {
    if request.id.is_none() {
        return Err(LibraryError::Validation(
            "library event id is required".to_string(),
        ));
    }

    let event = request.into_event(EventKind::Update);

    let meta = publisher.publish(&event).await?;

    info!(
        event_id = ?event.id,
        partition = meta.partition,
        "Accepted library event update"
    );
    Ok((StatusCode::OK, Json(event)))
}
