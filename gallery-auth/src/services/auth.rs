use gallery_core::error::AppError;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    dtos::auth::{
        AuthResponse, LoginRequest, OtpSentResponse, RegisterRequest, RegisterResponse,
        ResetPasswordRequest, VerifyOtpResponse,
    },
    models::{OtpPurpose, Principal, VerifyOutcome},
    services::{
        jwt::TokenError, JwtService, OtpStore, PrincipalRepository, ServiceError, TokenResponse,
    },
    utils::{hash_password, verify_password, Password, PasswordHashString},
};

/// Verified profile handed over by an external identity provider.
#[derive(Debug, Clone)]
pub struct OAuthProfile {
    pub external_id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

/// The authentication flow: orchestrates the OTP store, the token service
/// and the principal repository.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn PrincipalRepository>,
    otp: Arc<OtpStore>,
    jwt: JwtService,
}

impl AuthService {
    pub fn new(users: Arc<dyn PrincipalRepository>, otp: Arc<OtpStore>, jwt: JwtService) -> Self {
        Self { users, otp, jwt }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<RegisterResponse, ServiceError> {
        if req.password != req.confirm_password {
            return Err(ServiceError::PasswordConfirmMismatch);
        }

        if self
            .users
            .find_by_email(&req.email)
            .await
            .map_err(repo_err)?
            .is_some()
        {
            return Err(ServiceError::EmailAlreadyRegistered);
        }

        let password_hash = hash_password(&Password::new(req.password.clone()))
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Password hashing error: {}", e)))?;

        let principal = Principal::new(
            req.email.clone(),
            password_hash.into_string(),
            Some(req.name),
        );

        match self.users.insert(&principal).await {
            Ok(()) => {}
            Err(AppError::Conflict(_)) => return Err(ServiceError::EmailAlreadyRegistered),
            Err(e) => return Err(repo_err(e)),
        }

        tracing::info!(user_id = %principal.user_id, "User registered");

        // The account is usable immediately; verification follows by passcode
        let tokens = self.issue_tokens(&principal)?;

        // A failed dispatch is reported, never fatal to the registration
        let issued = self.otp.generate(&req.email, OtpPurpose::Registration).await;

        Ok(RegisterResponse {
            user: principal.sanitized(),
            tokens,
            otp_sent: issued.sent,
        })
    }

    pub async fn login(&self, req: LoginRequest) -> Result<TokenResponse, ServiceError> {
        let principal = self
            .users
            .find_by_email(&req.email)
            .await
            .map_err(repo_err)?
            .ok_or(ServiceError::InvalidCredentials)?;

        let stored_hash = principal
            .password_hash
            .as_deref()
            .ok_or(ServiceError::InvalidCredentials)?;

        verify_password(
            &Password::new(req.password),
            &PasswordHashString::new(stored_hash.to_string()),
        )
        .map_err(|_| ServiceError::InvalidCredentials)?;

        if !principal.active {
            return Err(ServiceError::AccountDisabled);
        }

        tracing::info!(user_id = %principal.user_id, "User logged in");

        self.issue_tokens(&principal)
    }

    /// Login (or first-time provision) through an external identity provider.
    ///
    /// Looks up by linkage first, then by email; a principal found by email
    /// without linkage is linked once and never re-linked. At most one
    /// principal ever exists per email.
    pub async fn oauth_login(&self, profile: OAuthProfile) -> Result<AuthResponse, ServiceError> {
        let existing = match self
            .users
            .find_by_google_id(&profile.external_id)
            .await
            .map_err(repo_err)?
        {
            Some(p) => Some(p),
            None => self
                .users
                .find_by_email(&profile.email)
                .await
                .map_err(repo_err)?,
        };

        let principal = match existing {
            Some(mut principal) => {
                if principal.google_id.is_none() {
                    principal.google_id = Some(profile.external_id.clone());
                    self.users.save(&principal).await.map_err(repo_err)?;
                    tracing::info!(user_id = %principal.user_id, "Linked external identity");
                }
                principal
            }
            None => {
                let principal = Principal::from_external_identity(
                    profile.external_id.clone(),
                    profile.email.clone(),
                    profile.name.clone(),
                    profile.avatar_url.clone(),
                );
                self.users.insert(&principal).await.map_err(repo_err)?;
                tracing::info!(user_id = %principal.user_id, "User provisioned from external identity");
                principal
            }
        };

        if !principal.active {
            return Err(ServiceError::AccountDisabled);
        }

        let tokens = self.issue_tokens(&principal)?;
        Ok(AuthResponse {
            user: principal.sanitized(),
            tokens,
        })
    }

    pub async fn request_otp(
        &self,
        email: &str,
        purpose: OtpPurpose,
    ) -> Result<OtpSentResponse, ServiceError> {
        // Password reset codes are only issued for known accounts; the other
        // purposes may precede the principal
        if purpose == OtpPurpose::ForgotPassword
            && self
                .users
                .find_by_email(email)
                .await
                .map_err(repo_err)?
                .is_none()
        {
            return Err(ServiceError::UserNotFound);
        }

        let issued = self.otp.generate(email, purpose).await;

        Ok(OtpSentResponse {
            expires_in: issued.expires_in,
            sent: issued.sent,
        })
    }

    pub async fn verify_otp_code(
        &self,
        email: &str,
        code: &str,
    ) -> Result<VerifyOtpResponse, ServiceError> {
        match self.otp.verify(email, code) {
            VerifyOutcome::Match { purpose } => {
                if purpose == OtpPurpose::Registration {
                    if let Some(mut principal) =
                        self.users.find_by_email(email).await.map_err(repo_err)?
                    {
                        if !principal.email_verified {
                            principal.email_verified = true;
                            self.users.save(&principal).await.map_err(repo_err)?;
                            tracing::info!(user_id = %principal.user_id, "Email verified");
                        }
                    }
                }
                Ok(VerifyOtpResponse {
                    verified: true,
                    purpose,
                })
            }
            VerifyOutcome::Mismatch { remaining } => Err(ServiceError::OtpMismatch { remaining }),
            VerifyOutcome::Locked => Err(ServiceError::OtpLocked),
            VerifyOutcome::Expired => Err(ServiceError::OtpExpired),
            VerifyOutcome::NotFound => Err(ServiceError::OtpNotFound),
        }
    }

    pub async fn reset_password(&self, req: ResetPasswordRequest) -> Result<(), ServiceError> {
        if req.new_password != req.confirm_password {
            return Err(ServiceError::PasswordConfirmMismatch);
        }

        // The gate is a previously verified passcode, not the code itself
        if !self.otp.is_verified(&req.email) {
            return Err(ServiceError::OtpVerificationRequired);
        }

        let mut principal = self
            .users
            .find_by_email(&req.email)
            .await
            .map_err(repo_err)?
            .ok_or(ServiceError::UserNotFound)?;

        // Deactivated accounts may not reset their way back in
        if !principal.active {
            return Err(ServiceError::AccountDisabled);
        }

        let password_hash = hash_password(&Password::new(req.new_password.clone()))
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Password hashing error: {}", e)))?;

        principal.password_hash = Some(password_hash.into_string());
        self.users.save(&principal).await.map_err(repo_err)?;

        self.otp.clear(&req.email);

        tracing::info!(user_id = %principal.user_id, "Password reset successful");

        Ok(())
    }

    /// Mint a new access token from a valid refresh token.
    ///
    /// The refresh token must verify; an expired access token is never
    /// decoded as a fallback. The principal is re-read so that role and
    /// activation changes take effect at the next rotation.
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, ServiceError> {
        let claims = self.jwt.verify_refresh_token(refresh_token)?;

        let user_id = Uuid::parse_str(&claims.subject_id)
            .map_err(|_| ServiceError::Token(TokenError::Invalid))?;

        let principal = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(repo_err)?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !principal.active {
            return Err(ServiceError::AccountDisabled);
        }

        let access_token = self.jwt.rotate(refresh_token, principal.role())?;

        tracing::info!(user_id = %principal.user_id, "Access token refreshed");

        Ok(TokenResponse::new(
            access_token,
            refresh_token.to_string(),
            self.jwt.access_token_expiry_seconds(),
        ))
    }

    /// Clear any live passcode for the principal. Tokens are stateless and
    /// simply expire.
    pub async fn logout(&self, subject_id: &str) -> Result<(), ServiceError> {
        if let Ok(user_id) = Uuid::parse_str(subject_id) {
            if let Some(principal) = self.users.find_by_id(user_id).await.map_err(repo_err)? {
                self.otp.clear(&principal.email);
                tracing::info!(user_id = %principal.user_id, "User logged out");
            }
        }
        Ok(())
    }

    /// Activate or deactivate an account (administrative action).
    pub async fn set_account_state(
        &self,
        user_id: Uuid,
        active: bool,
    ) -> Result<Principal, ServiceError> {
        let mut principal = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(repo_err)?
            .ok_or(ServiceError::UserNotFound)?;

        principal.active = active;
        self.users.save(&principal).await.map_err(repo_err)?;

        tracing::info!(user_id = %principal.user_id, active, "Account state updated");

        Ok(principal)
    }

    fn issue_tokens(&self, principal: &Principal) -> Result<TokenResponse, ServiceError> {
        let (access_token, refresh_token) = self
            .jwt
            .issue_token_pair(&principal.user_id.to_string(), principal.role())?;

        Ok(TokenResponse::new(
            access_token,
            refresh_token,
            self.jwt.access_token_expiry_seconds(),
        ))
    }
}

fn repo_err(e: AppError) -> ServiceError {
    ServiceError::Internal(anyhow::anyhow!("Repository error: {}", e))
}
