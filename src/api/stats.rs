//! Statistics endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

use super::AuthenticatedUser;

/// Inventory statistics response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Number of equipment records
    pub total_count: i64,
    /// Sum of purchase prices (missing price counts as 0)
    pub total_value: f64,
    pub broken_count: i64,
    pub available_count: i64,
    pub in_service_count: i64,
    pub unavailable_count: i64,
    /// Number of employees
    pub employee_count: i64,
    /// Number of equipment types
    pub type_count: i64,
    /// Every state, in declaration order
    pub by_state: Vec<StatEntry>,
    /// By the assignee's territory, `unassigned` for the rest
    pub by_territory: Vec<StatEntry>,
    /// By resolved type label
    pub by_type: Vec<StatEntry>,
    pub by_brand: Vec<StatEntry>,
    /// By purchase place
    pub by_vendor: Vec<StatEntry>,
    /// Type breakdown ranked by value
    pub top_types_by_value: Vec<StatEntry>,
    /// Brand breakdown ranked by value
    pub top_brands_by_value: Vec<StatEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StatEntry {
    /// Group key
    pub label: String,
    /// Number of equipment records
    pub count: i64,
    /// Sum of purchase prices
    pub value: f64,
}

/// Get inventory statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Inventory statistics", body = StatsResponse)
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<StatsResponse>> {
    let stats = state.services.stats.get_stats().await?;
    Ok(Json(stats))
}
