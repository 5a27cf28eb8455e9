//! Export endpoints
//!
//! Flat rows for an external spreadsheet formatter.

use axum::{extract::State, Json};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::enums::{EquipmentState, Territory},
};

use super::{stats::StatsResponse, AuthenticatedUser};

/// One equipment row with its assignee's contact columns
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EquipmentExportRow {
    pub id: i64,
    #[serde(rename = "type")]
    pub type_label: String,
    pub brand: String,
    pub model: String,
    pub serial_number: Option<String>,
    pub state: EquipmentState,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_place: Option<String>,
    pub price: Option<f64>,
    pub warranty_years: Option<i64>,
    pub employee: Option<String>,
    pub employee_email: Option<String>,
    pub employee_phone: Option<String>,
    pub employee_role: Option<String>,
    pub employee_territory: Option<Territory>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One employee row with a compact list of assigned equipment
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeExportRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub territory: Territory,
    pub comment: Option<String>,
    pub equipment_count: i64,
    /// "type - brand model" entries joined by " | "
    pub equipment_summary: String,
}

/// Statistics summary export
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatsExport {
    pub generated_at: DateTime<Utc>,
    /// Total value divided by equipment count, 0 when empty
    pub average_value: f64,
    #[serde(flatten)]
    pub stats: StatsResponse,
}

/// Export equipment rows
#[utoipa::path(
    get,
    path = "/export/equipment",
    tag = "export",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Equipment rows", body = Vec<EquipmentExportRow>)
    )
)]
pub async fn export_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<EquipmentExportRow>>> {
    let rows = state.services.export.equipment().await?;
    Ok(Json(rows))
}

/// Export employee rows
#[utoipa::path(
    get,
    path = "/export/employees",
    tag = "export",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Employee rows", body = Vec<EmployeeExportRow>)
    )
)]
pub async fn export_employees(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<EmployeeExportRow>>> {
    let rows = state.services.export.employees().await?;
    Ok(Json(rows))
}

/// Export the statistics summary
#[utoipa::path(
    get,
    path = "/export/stats",
    tag = "export",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Statistics summary", body = StatsExport)
    )
)]
pub async fn export_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<StatsExport>> {
    let summary = state.services.export.stats().await?;
    Ok(Json(summary))
}
