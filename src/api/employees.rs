//! Employee endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::employee::{Employee, EmployeeInput, EmployeeProfile, TerritoryGroup},
};

use super::AuthenticatedUser;

/// List employees by territory then name
#[utoipa::path(
    get,
    path = "/employees",
    tag = "employees",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Employee list", body = Vec<Employee>)
    )
)]
pub async fn list_employees(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Employee>>> {
    let employees = state.services.employees.list().await?;
    Ok(Json(employees))
}

/// Employees grouped by territory
#[utoipa::path(
    get,
    path = "/employees/directory",
    tag = "employees",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "One group per territory", body = Vec<TerritoryGroup>)
    )
)]
pub async fn directory(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<TerritoryGroup>>> {
    let groups = state.services.employees.directory().await?;
    Ok(Json(groups))
}

/// Employee profile with assigned equipment
#[utoipa::path(
    get,
    path = "/employees/{id}",
    tag = "employees",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee profile", body = EmployeeProfile),
        (status = 404, description = "Employee not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_employee(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<EmployeeProfile>> {
    let profile = state.services.employees.profile(id).await?;
    Ok(Json(profile))
}

/// Create an employee
#[utoipa::path(
    post,
    path = "/employees",
    tag = "employees",
    security(("bearer_auth" = [])),
    request_body = EmployeeInput,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already used", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_employee(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Json(data): Json<EmployeeInput>,
) -> AppResult<(StatusCode, Json<Employee>)> {
    let employee = state.services.employees.create(data).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

/// Update an employee
#[utoipa::path(
    put,
    path = "/employees/{id}",
    tag = "employees",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Employee ID")),
    request_body = EmployeeInput,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 404, description = "Employee not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already used", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_employee(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(data): Json<EmployeeInput>,
) -> AppResult<Json<Employee>> {
    let employee = state.services.employees.update(id, data).await?;
    Ok(Json(employee))
}

/// Delete an employee; their equipment is unassigned
#[utoipa::path(
    delete,
    path = "/employees/{id}",
    tag = "employees",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Employee ID")),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 404, description = "Employee not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_employee(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.employees.retire(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
