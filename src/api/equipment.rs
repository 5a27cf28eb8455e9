//! Equipment API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::Multipart;

use crate::{
    error::AppResult,
    models::{
        credential::{Credential, CredentialsUpdate},
        equipment::{Equipment, EquipmentDetail, EquipmentFilter, EquipmentInput, EquipmentQuery, FilterOptions},
    },
};

use super::{attachment, read_multipart, AuthenticatedUser};

/// Multipart part carrying the invoice
const INVOICE_PART: &str = "invoice";

/// List equipment matching the filters
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(EquipmentQuery),
    responses(
        (status = 200, description = "Equipment list", body = Vec<Equipment>)
    )
)]
pub async fn list_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<EquipmentQuery>,
) -> AppResult<Json<Vec<Equipment>>> {
    let filter = EquipmentFilter::from(query);
    let equipment = state.services.equipment.list(&filter).await?;
    Ok(Json(equipment))
}

/// Values available to the list filters
#[utoipa::path(
    get,
    path = "/equipment/filter-options",
    tag = "equipment",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Filter options", body = FilterOptions)
    )
)]
pub async fn filter_options(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<FilterOptions>> {
    let options = state.services.equipment.filter_options().await?;
    Ok(Json(options))
}

/// Get equipment with credentials and history
#[utoipa::path(
    get,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment details", body = EquipmentDetail),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<EquipmentDetail>> {
    let detail = state.services.equipment.detail(id).await?;
    Ok(Json(detail))
}

/// Create equipment (multipart: `payload` JSON and optional `invoice` file)
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body(content = EquipmentInput, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Equipment created", body = Equipment),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Equipment>)> {
    let max_file_size = state.config.uploads.max_file_size;
    let (input, invoice) = read_multipart::<EquipmentInput>(multipart, INVOICE_PART, max_file_size).await?;
    let equipment = state.services.equipment.create(input, invoice).await?;
    Ok((StatusCode::CREATED, Json(equipment)))
}

/// Update equipment (multipart, same parts as create)
#[utoipa::path(
    put,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Equipment ID")),
    request_body(content = EquipmentInput, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Equipment updated", body = Equipment),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> AppResult<Json<Equipment>> {
    let max_file_size = state.config.uploads.max_file_size;
    let (input, invoice) = read_multipart::<EquipmentInput>(multipart, INVOICE_PART, max_file_size).await?;
    let equipment = state.services.equipment.update(id, input, invoice).await?;
    Ok(Json(equipment))
}

/// Delete equipment with its credentials, events and files
#[utoipa::path(
    delete,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Equipment ID")),
    responses(
        (status = 204, description = "Equipment deleted"),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.equipment.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Download the invoice
#[utoipa::path(
    get,
    path = "/equipment/{id}/invoice",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Invoice file", content_type = "application/octet-stream"),
        (status = 404, description = "No invoice", body = crate::error::ErrorResponse)
    )
)]
pub async fn download_invoice(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let (file_ref, bytes) = state.services.equipment.invoice(id).await?;
    Ok(attachment(&file_ref, bytes))
}

/// List credentials
#[utoipa::path(
    get,
    path = "/equipment/{id}/credentials",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Credentials", body = Vec<Credential>)
    )
)]
pub async fn list_credentials(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Credential>>> {
    let credentials = state.services.equipment.credentials(id).await?;
    Ok(Json(credentials))
}

/// Replace the whole credential list
#[utoipa::path(
    put,
    path = "/equipment/{id}/credentials",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Equipment ID")),
    request_body = CredentialsUpdate,
    responses(
        (status = 200, description = "Credentials after replacement", body = Vec<Credential>),
        (status = 400, description = "Incomplete credential", body = crate::error::ErrorResponse)
    )
)]
pub async fn replace_credentials(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(data): Json<CredentialsUpdate>,
) -> AppResult<Json<Vec<Credential>>> {
    let credentials = state
        .services
        .equipment
        .replace_credentials(id, data.credentials)
        .await?;
    Ok(Json(credentials))
}
