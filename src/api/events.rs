//! Equipment event endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::Multipart;

use crate::{
    error::AppResult,
    models::event::{Event, EventInput},
};

use super::{attachment, read_multipart, AuthenticatedUser};

/// Multipart part carrying the event document
const DOCUMENT_PART: &str = "document";

/// List an equipment's events, most recent first
#[utoipa::path(
    get,
    path = "/equipment/{id}/events",
    tag = "events",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Event history", body = Vec<Event>),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_events(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Event>>> {
    let events = state.services.events.list(id).await?;
    Ok(Json(events))
}

/// Record an event (multipart: `payload` JSON and optional `document` file)
#[utoipa::path(
    post,
    path = "/equipment/{id}/events",
    tag = "events",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Equipment ID")),
    request_body(content = EventInput, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Event recorded", body = Event),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_event(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Event>)> {
    let max_file_size = state.config.uploads.max_file_size;
    let (input, document) = read_multipart::<EventInput>(multipart, DOCUMENT_PART, max_file_size).await?;
    let event = state.services.events.create(id, input, document).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Update an event (multipart, same parts as create)
#[utoipa::path(
    put,
    path = "/equipment/{id}/events/{event_id}",
    tag = "events",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Equipment ID"),
        ("event_id" = i64, Path, description = "Event ID")
    ),
    request_body(content = EventInput, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Event not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_event(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path((id, event_id)): Path<(i64, i64)>,
    multipart: Multipart,
) -> AppResult<Json<Event>> {
    let max_file_size = state.config.uploads.max_file_size;
    let (input, document) = read_multipart::<EventInput>(multipart, DOCUMENT_PART, max_file_size).await?;
    let event = state.services.events.update(id, event_id, input, document).await?;
    Ok(Json(event))
}

/// Delete an event and its document
#[utoipa::path(
    delete,
    path = "/equipment/{id}/events/{event_id}",
    tag = "events",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Equipment ID"),
        ("event_id" = i64, Path, description = "Event ID")
    ),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 404, description = "Event not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_event(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path((id, event_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state.services.events.delete(id, event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Download an event's document
#[utoipa::path(
    get,
    path = "/equipment/{id}/events/{event_id}/document",
    tag = "events",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Equipment ID"),
        ("event_id" = i64, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Document file", content_type = "application/octet-stream"),
        (status = 404, description = "No document", body = crate::error::ErrorResponse)
    )
)]
pub async fn download_document(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path((id, event_id)): Path<(i64, i64)>,
) -> AppResult<impl IntoResponse> {
    let (file_ref, bytes) = state.services.events.document(id, event_id).await?;
    Ok(attachment(&file_ref, bytes))
}
