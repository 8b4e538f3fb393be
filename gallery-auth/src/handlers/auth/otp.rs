//! Passcode send/verify handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use gallery_core::error::AppError;

use crate::{
    dtos::auth::{SendOtpRequest, VerifyOtpRequest},
    utils::ValidatedJson,
    AppState,
};

/// Send a passcode to an email address
#[utoipa::path(
    post,
    path = "/auth/otp/send",
    request_body = SendOtpRequest,
    responses(
        (status = 200, description = "Passcode issued", body = OtpSentResponse),
        (status = 404, description = "Unknown account for password reset", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn send_otp(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SendOtpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = state
        .auth_service
        .request_otp(&req.email, req.purpose)
        .await?;
    Ok((StatusCode::OK, Json(res)))
}

/// Verify a passcode
#[utoipa::path(
    post,
    path = "/auth/otp/verify",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Passcode verified", body = VerifyOtpResponse),
        (status = 400, description = "Passcode expired", body = ErrorResponse),
        (status = 401, description = "Incorrect passcode", body = ErrorResponse),
        (status = 404, description = "No passcode requested", body = ErrorResponse),
        (status = 423, description = "Attempts exhausted", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn verify_otp(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<VerifyOtpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = state
        .auth_service
        .verify_otp_code(&req.email, &req.code)
        .await?;
    Ok((StatusCode::OK, Json(res)))
}
