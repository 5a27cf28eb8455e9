//! API handlers for Invent REST endpoints

pub mod auth;
pub mod backup;
pub mod employees;
pub mod equipment;
pub mod equipment_types;
pub mod events;
pub mod export;
pub mod health;
pub mod openapi;
pub mod stats;

use axum::{
    async_trait,
    body::Bytes,
    extract::{DefaultBodyLimit, FromRequestParts},
    http::{header, request::Parts},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use axum_extra::{
    extract::{
        multipart::{Field, MultipartError},
        Multipart,
    },
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::de::DeserializeOwned;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, AppResult},
    models::admin::AdminClaims,
    services::files::{content_type_for, Upload},
    AppState,
};

/// Multipart part carrying the JSON request body
pub const PAYLOAD_PART: &str = "payload";

/// Largest accepted `payload` part
const MAX_PAYLOAD_SIZE: usize = 1024 * 1024;

/// Length of the `<uuid>-` prefix of stored file references
const STORED_PREFIX_LEN: usize = 37;

/// Extractor for an authenticated admin from the bearer token
pub struct AuthenticatedUser(pub AdminClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Authentication("Missing or invalid authorization header".to_string()))?;

        let claims = state.services.auth.verify_token(bearer.token())?;
        Ok(AuthenticatedUser(claims))
    }
}

/// Read a `payload` JSON part and an optional file part.
///
/// A file part is kept up to `max_file_size + 1` bytes and the rest is drained,
/// so an oversized file reaches validation instead of failing the request.
pub async fn read_multipart<T: DeserializeOwned>(
    mut multipart: Multipart,
    file_part: &str,
    max_file_size: usize,
) -> AppResult<(T, Option<Upload>)> {
    let mut payload = None;
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == PAYLOAD_PART {
            let (text, overflow) = read_capped(field, MAX_PAYLOAD_SIZE).await?;
            if overflow {
                return Err(AppError::BadRequest(format!("'{}' part is too large", PAYLOAD_PART)));
            }
            let value = serde_json::from_slice::<T>(&text)
                .map_err(|e| AppError::BadRequest(format!("Invalid payload: {}", e)))?;
            payload = Some(value);
        } else if name == file_part {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field
                .content_type()
                .map(str::to_string)
                .unwrap_or_else(|| content_type_for(&file_name).to_string());
            let (bytes, _) = read_capped(field, max_file_size + 1).await?;
            // browsers send an empty part when no file was picked
            if !bytes.is_empty() {
                upload = Some(Upload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
        }
    }

    let payload = payload.ok_or_else(|| AppError::BadRequest(format!("Missing '{}' part", PAYLOAD_PART)))?;
    Ok((payload, upload))
}

/// First `limit` bytes of a part, and whether more followed
async fn read_capped(mut field: Field, limit: usize) -> AppResult<(Bytes, bool)> {
    let mut buffer = Vec::new();
    let mut overflow = false;
    while let Some(chunk) = field.chunk().await.map_err(invalid_multipart)? {
        let room = limit - buffer.len();
        if chunk.len() > room {
            overflow = true;
        }
        buffer.extend_from_slice(&chunk[..chunk.len().min(room)]);
    }
    Ok((Bytes::from(buffer), overflow))
}

fn invalid_multipart(e: MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid multipart request: {}", e))
}

/// Stored file as a download
pub fn attachment(file_ref: &str, bytes: Vec<u8>) -> impl IntoResponse {
    let file_name = file_ref
        .get(STORED_PREFIX_LEN..)
        .filter(|name| !name.is_empty())
        .unwrap_or(file_ref);
    (
        [
            (header::CONTENT_TYPE, content_type_for(file_ref).to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // room for the JSON part next to a maximal file
    let body_limit = state.config.uploads.max_file_size + MAX_PAYLOAD_SIZE;

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Equipment types
        .route(
            "/types",
            get(equipment_types::list_types).post(equipment_types::create_type),
        )
        .route(
            "/types/:id",
            get(equipment_types::get_type)
                .put(equipment_types::update_type)
                .delete(equipment_types::delete_type),
        )
        // Employees
        .route(
            "/employees",
            get(employees::list_employees).post(employees::create_employee),
        )
        .route("/employees/directory", get(employees::directory))
        .route(
            "/employees/:id",
            get(employees::get_employee)
                .put(employees::update_employee)
                .delete(employees::delete_employee),
        )
        // Equipment
        .route(
            "/equipment",
            get(equipment::list_equipment)
                .merge(post(equipment::create_equipment).layer(DefaultBodyLimit::disable())),
        )
        .route("/equipment/filter-options", get(equipment::filter_options))
        .route(
            "/equipment/:id",
            get(equipment::get_equipment)
                .delete(equipment::delete_equipment)
                .merge(put(equipment::update_equipment).layer(DefaultBodyLimit::disable())),
        )
        .route("/equipment/:id/invoice", get(equipment::download_invoice))
        .route(
            "/equipment/:id/credentials",
            get(equipment::list_credentials).put(equipment::replace_credentials),
        )
        // Events
        .route(
            "/equipment/:id/events",
            get(events::list_events)
                .merge(post(events::create_event).layer(DefaultBodyLimit::disable())),
        )
        .route(
            "/equipment/:id/events/:event_id",
            delete(events::delete_event)
                .merge(put(events::update_event).layer(DefaultBodyLimit::disable())),
        )
        .route(
            "/equipment/:id/events/:event_id/document",
            get(events::download_document),
        )
        // Statistics
        .route("/stats", get(stats::get_stats))
        // Backup
        .route("/backups", post(backup::create_backup))
        // Export
        .route("/export/equipment", get(export::export_equipment))
        .route("/export/employees", get(export::export_employees))
        .route("/export/stats", get(export::export_stats))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
