//! Administrative user management. Every handler role-gates on admin.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use gallery_core::error::AppError;
use uuid::Uuid;

use crate::{
    dtos::auth::UpdateAccountStateRequest,
    middleware::AuthUser,
    models::Role,
    services::AccessPolicy,
    AppState,
};

/// Get any user's profile (admin only)
#[utoipa::path(
    get,
    path = "/auth/admin/users/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = PrincipalResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let actor = user.actor()?;
    AccessPolicy::require_role(&actor, &[Role::Admin])?;

    let principal = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;

    Ok((StatusCode::OK, Json(principal.sanitized())))
}

/// Activate or deactivate an account (admin only)
#[utoipa::path(
    patch,
    path = "/auth/admin/users/{user_id}/state",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateAccountStateRequest,
    responses(
        (status = 200, description = "Account state updated", body = PrincipalResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_account_state(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateAccountStateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let actor = user.actor()?;
    AccessPolicy::require_role(&actor, &[Role::Admin])?;

    let principal = state
        .auth_service
        .set_account_state(user_id, req.active)
        .await?;

    Ok((StatusCode::OK, Json(principal.sanitized())))
}
