//! Authentication endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppResult;

use super::AuthenticatedUser;

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Admin username
    pub username: String,
    /// Password
    pub password: String,
}

/// Login response
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    /// JWT access token
    pub token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub admin: AdminInfo,
}

/// Authenticated admin
#[derive(Serialize, ToSchema)]
pub struct AdminInfo {
    pub id: i64,
    pub username: String,
}

/// Log in with admin credentials
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, admin) = state
        .services
        .auth
        .authenticate(&request.username, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.services.auth.expires_in_secs(),
        admin: AdminInfo {
            id: admin.id,
            username: admin.username,
        },
    }))
}

/// Current admin
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current admin", body = AdminInfo),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<AdminInfo>> {
    let admin = state.services.auth.get_admin(claims.admin_id).await?;
    Ok(Json(AdminInfo {
        id: admin.id,
        username: admin.username,
    }))
}
