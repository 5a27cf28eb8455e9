//! Equipment type endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::equipment_type::{EquipmentType, EquipmentTypeInput},
};

use super::AuthenticatedUser;

/// List equipment types
#[utoipa::path(
    get,
    path = "/types",
    tag = "types",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Types with their equipment count", body = Vec<EquipmentType>)
    )
)]
pub async fn list_types(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<EquipmentType>>> {
    let types = state.services.types.list().await?;
    Ok(Json(types))
}

/// Get an equipment type
#[utoipa::path(
    get,
    path = "/types/{id}",
    tag = "types",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Type ID")),
    responses(
        (status = 200, description = "Type details", body = EquipmentType),
        (status = 404, description = "Type not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_type(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<EquipmentType>> {
    let equipment_type = state.services.types.get_by_id(id).await?;
    Ok(Json(equipment_type))
}

/// Create an equipment type
#[utoipa::path(
    post,
    path = "/types",
    tag = "types",
    security(("bearer_auth" = [])),
    request_body = EquipmentTypeInput,
    responses(
        (status = 201, description = "Type created", body = EquipmentType),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Name already used", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_type(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Json(data): Json<EquipmentTypeInput>,
) -> AppResult<(StatusCode, Json<EquipmentType>)> {
    let equipment_type = state.services.types.create(data).await?;
    Ok((StatusCode::CREATED, Json(equipment_type)))
}

/// Rename or describe an equipment type
#[utoipa::path(
    put,
    path = "/types/{id}",
    tag = "types",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Type ID")),
    request_body = EquipmentTypeInput,
    responses(
        (status = 200, description = "Type updated", body = EquipmentType),
        (status = 404, description = "Type not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Name already used", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_type(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(data): Json<EquipmentTypeInput>,
) -> AppResult<Json<EquipmentType>> {
    let equipment_type = state.services.types.update(id, data).await?;
    Ok(Json(equipment_type))
}

/// Delete an equipment type; its equipment is kept and unlinked
#[utoipa::path(
    delete,
    path = "/types/{id}",
    tag = "types",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Type ID")),
    responses(
        (status = 204, description = "Type deleted"),
        (status = 404, description = "Type not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_type(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.types.retire(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
