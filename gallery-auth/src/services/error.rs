use gallery_core::error::AppError;
use thiserror::Error;

use crate::services::jwt::TokenError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is deactivated")]
    AccountDisabled,

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Passwords do not match")]
    PasswordConfirmMismatch,

    #[error("User not found")]
    UserNotFound,

    #[error("No passcode requested for this address")]
    OtpNotFound,

    #[error("Passcode has expired")]
    OtpExpired,

    #[error("Incorrect passcode, {remaining} attempts remaining")]
    OtpMismatch { remaining: u32 },

    #[error("Too many incorrect attempts, passcode invalidated")]
    OtpLocked,

    #[error("Passcode verification required before resetting the password")]
    OtpVerificationRequired,

    #[error("Invalid or expired token")]
    Token(#[from] TokenError),

    #[error("Email error: {0}")]
    EmailError(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Internal(e) => AppError::InternalError(e),
            ServiceError::InvalidCredentials => {
                AppError::Unauthorized(anyhow::anyhow!("Invalid credentials"))
            }
            ServiceError::AccountDisabled => {
                AppError::Forbidden(anyhow::anyhow!("Account is deactivated"))
            }
            ServiceError::EmailAlreadyRegistered => {
                AppError::Conflict(anyhow::anyhow!("Email already registered"))
            }
            ServiceError::PasswordConfirmMismatch => {
                AppError::BadRequest(anyhow::anyhow!("Passwords do not match"))
            }
            ServiceError::UserNotFound => AppError::NotFound(anyhow::anyhow!("User not found")),
            ServiceError::OtpNotFound => {
                AppError::NotFound(anyhow::anyhow!("No passcode requested for this address"))
            }
            ServiceError::OtpExpired => AppError::Expired(anyhow::anyhow!("Passcode has expired")),
            ServiceError::OtpMismatch { remaining } => AppError::AuthError(anyhow::anyhow!(
                "Incorrect passcode, {} attempts remaining",
                remaining
            )),
            ServiceError::OtpLocked => AppError::Locked(anyhow::anyhow!(
                "Too many incorrect attempts, passcode invalidated"
            )),
            ServiceError::OtpVerificationRequired => AppError::VerificationRequired(
                anyhow::anyhow!("Passcode verification required before resetting the password"),
            ),
            ServiceError::Token(TokenError::Signing) => {
                AppError::InternalError(anyhow::anyhow!("Token signing failed"))
            }
            ServiceError::Token(e) => AppError::Unauthorized(anyhow::anyhow!(e.to_string())),
            ServiceError::EmailError(e) => AppError::EmailError(e),
        }
    }
}
