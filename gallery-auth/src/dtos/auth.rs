use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{OtpPurpose, PrincipalResponse};
use crate::services::TokenResponse;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    #[schema(example = "Ann Example")]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "ann@example.com")]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "password123", min_length = 8)]
    pub password: String,

    #[validate(length(min = 8, message = "Password confirmation must be at least 8 characters"))]
    #[schema(example = "password123", min_length = 8)]
    pub confirm_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user: PrincipalResponse,
    pub tokens: TokenResponse,
    /// False when the confirmation passcode could not be dispatched.
    #[schema(example = true)]
    pub otp_sent: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "ann@example.com")]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "password123")]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    #[schema(example = "refresh-token-123")]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendOtpRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "ann@example.com")]
    pub email: String,

    pub purpose: OtpPurpose,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OtpSentResponse {
    /// Seconds until the passcode expires.
    #[schema(example = 600)]
    pub expires_in: i64,
    /// False when the email collaborator failed; the code is live anyway.
    #[schema(example = true)]
    pub sent: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyOtpRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "ann@example.com")]
    pub email: String,

    #[validate(length(min = 4, message = "Code is required"))]
    #[schema(example = "123456")]
    pub code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyOtpResponse {
    #[schema(example = true)]
    pub verified: bool,
    pub purpose: OtpPurpose,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PasswordResetRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "ann@example.com")]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "ann@example.com")]
    pub email: String,

    /// Wire-contract field; the gate is the prior successful verification.
    #[schema(example = "123456")]
    pub code: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "newpassword123", min_length = 8)]
    pub new_password: String,

    #[validate(length(min = 8, message = "Password confirmation must be at least 8 characters"))]
    #[schema(example = "newpassword123", min_length = 8)]
    pub confirm_password: String,
}

/// Auth response with principal info and tokens.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: PrincipalResponse,
    pub tokens: TokenResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAccountStateRequest {
    #[schema(example = false)]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct GoogleCallbackQuery {
    pub code: String,
    pub state: String,
}
