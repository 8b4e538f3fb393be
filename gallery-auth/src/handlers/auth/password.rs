use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use gallery_core::error::AppError;

use crate::{
    dtos::auth::{PasswordResetRequest, ResetPasswordRequest},
    models::OtpPurpose,
    services::ServiceError,
    utils::ValidatedJson,
    AppState,
};

/// Request a password-reset passcode
#[utoipa::path(
    post,
    path = "/auth/password-reset/request",
    request_body = PasswordResetRequest,
    responses(
        (status = 200, description = "Passcode issued if the account exists", body = OtpSentResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn request_password_reset(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<PasswordResetRequest>,
) -> Result<impl IntoResponse, AppError> {
    // Always answer 200: an unknown address must not be enumerable here
    match state
        .auth_service
        .request_otp(&req.email, OtpPurpose::ForgotPassword)
        .await
    {
        Ok(res) => Ok((StatusCode::OK, Json(res))),
        Err(ServiceError::UserNotFound) => Ok((
            StatusCode::OK,
            Json(crate::dtos::auth::OtpSentResponse {
                expires_in: 0,
                sent: false,
            }),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Reset the password after a verified passcode
#[utoipa::path(
    post,
    path = "/auth/password-reset/confirm",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset successfully"),
        (status = 403, description = "Passcode verification required", body = ErrorResponse),
        (status = 404, description = "Unknown account", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.auth_service.reset_password(req).await?;
    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "Password reset successfully"
        })),
    ))
}
