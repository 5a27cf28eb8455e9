//! Backup endpoint

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

use super::AuthenticatedUser;

/// Database copy written to the backup directory
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BackupInfo {
    pub file_name: String,
    /// Location on the server
    pub path: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

/// Write a timestamped copy of the database
#[utoipa::path(
    post,
    path = "/backups",
    tag = "backup",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Backup written", body = BackupInfo),
        (status = 409, description = "A backup was taken this second", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_backup(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<(StatusCode, Json<BackupInfo>)> {
    let info = state.services.backup.create().await?;
    Ok((StatusCode::CREATED, Json(info)))
}
