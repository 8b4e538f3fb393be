use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::config::JwtConfig;
use crate::models::Role;

/// Marker carried by refresh tokens so they can never pass as access tokens.
const REFRESH_TOKEN_TYPE: &str = "refresh";

/// Typed verification failure. Every token check yields either valid claims
/// or one of these; no code path consumes unverified claims.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token is invalid")]
    Invalid,
    #[error("wrong token type")]
    WrongType,
    #[error("token signing failed")]
    Signing,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        }
    }
}

/// JWT service for token issuance and verification
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expiry_minutes: i64,
    refresh_token_expiry_days: i64,
}

/// Claims for access tokens (short-lived)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (principal ID)
    #[serde(rename = "subjectId")]
    pub subject_id: String,
    /// Principal role at issuance time
    pub role: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl AccessTokenClaims {
    pub fn role(&self) -> Role {
        Role::parse(&self.role)
    }
}

/// Claims for refresh tokens (long-lived)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    /// Subject (principal ID)
    #[serde(rename = "subjectId")]
    pub subject_id: String,
    /// Always `"refresh"`
    #[serde(rename = "type")]
    pub token_type: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Token pair returned to the client
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl TokenResponse {
    pub fn new(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

impl JwtService {
    /// Create a new JWT service from the shared HS256 secret.
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            access_token_expiry_minutes: config.access_token_expiry_minutes,
            refresh_token_expiry_days: config.refresh_token_expiry_days,
        }
    }

    /// Issue an access token for a principal
    pub fn issue_access_token(&self, subject_id: &str, role: Role) -> Result<String, TokenError> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.access_token_expiry_minutes);

        let claims = AccessTokenClaims {
            subject_id: subject_id.to_string(),
            role: role.as_str().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| TokenError::Signing)
    }

    /// Issue a refresh token for a principal
    pub fn issue_refresh_token(&self, subject_id: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let exp = now + Duration::days(self.refresh_token_expiry_days);

        let claims = RefreshTokenClaims {
            subject_id: subject_id.to_string(),
            token_type: REFRESH_TOKEN_TYPE.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| TokenError::Signing)
    }

    /// Issue both access and refresh tokens
    pub fn issue_token_pair(
        &self,
        subject_id: &str,
        role: Role,
    ) -> Result<(String, String), TokenError> {
        let access_token = self.issue_access_token(subject_id, role)?;
        let refresh_token = self.issue_refresh_token(subject_id)?;
        Ok((access_token, refresh_token))
    }

    /// Verify and decode an access token
    pub fn verify_access_token(&self, token: &str) -> Result<AccessTokenClaims, TokenError> {
        let validation = self.validation();
        let token_data = decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    /// Verify and decode a refresh token
    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshTokenClaims, TokenError> {
        let validation = self.validation();
        let token_data = decode::<RefreshTokenClaims>(token, &self.decoding_key, &validation)?;

        if token_data.claims.token_type != REFRESH_TOKEN_TYPE {
            return Err(TokenError::WrongType);
        }

        Ok(token_data.claims)
    }

    /// Verify `refresh_token` and mint a fresh access token for its subject.
    ///
    /// The role is supplied by the caller, which re-reads it from the
    /// principal repository; a stale role claim in an old access token never
    /// survives a rotation.
    pub fn rotate(&self, refresh_token: &str, role: Role) -> Result<String, TokenError> {
        let claims = self.verify_refresh_token(refresh_token)?;
        self.issue_access_token(&claims.subject_id, role)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation
    }

    /// Get access token expiry in seconds (for client info)
    pub fn access_token_expiry_seconds(&self) -> i64 {
        self.access_token_expiry_minutes * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn test_service() -> JwtService {
        JwtService::new(&JwtConfig {
            secret: "test-secret-not-for-production".to_string(),
            access_token_expiry_minutes: 60,
            refresh_token_expiry_days: 7,
        })
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = test_service();
        let subject = Uuid::new_v4().to_string();

        let token = service
            .issue_access_token(&subject, Role::Admin)
            .expect("issue access token");
        assert!(!token.is_empty());

        let claims = service.verify_access_token(&token).expect("verify");
        assert_eq!(claims.subject_id, subject);
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.role(), Role::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_token_round_trip() {
        let service = test_service();
        let subject = Uuid::new_v4().to_string();

        let token = service
            .issue_refresh_token(&subject)
            .expect("issue refresh token");

        let claims = service.verify_refresh_token(&token).expect("verify");
        assert_eq!(claims.subject_id, subject);
        assert_eq!(claims.token_type, "refresh");
    }

    #[test]
    fn test_access_lifetime_shorter_than_refresh() {
        let service = test_service();
        let subject = Uuid::new_v4().to_string();

        let (access, refresh) = service
            .issue_token_pair(&subject, Role::User)
            .expect("issue pair");

        let access_claims = service.verify_access_token(&access).expect("verify access");
        let refresh_claims = service
            .verify_refresh_token(&refresh)
            .expect("verify refresh");
        assert!(access_claims.exp < refresh_claims.exp);
    }

    #[test]
    fn test_refresh_verification_rejects_access_token() {
        let service = test_service();
        let token = service
            .issue_access_token(&Uuid::new_v4().to_string(), Role::User)
            .expect("issue");

        // An access token carries no `type` claim
        assert_eq!(
            service.verify_refresh_token(&token),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_access_verification_rejects_refresh_token() {
        let service = test_service();
        let token = service
            .issue_refresh_token(&Uuid::new_v4().to_string())
            .expect("issue");

        // A refresh token carries no `role` claim
        assert_eq!(
            service.verify_access_token(&token),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_wrong_type_marker_is_rejected() {
        let service = test_service();
        let now = Utc::now();
        let claims = RefreshTokenClaims {
            subject_id: Uuid::new_v4().to_string(),
            token_type: "access".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret-not-for-production"),
        )
        .expect("encode");

        assert_eq!(
            service.verify_refresh_token(&token),
            Err(TokenError::WrongType)
        );
    }

    #[test]
    fn test_expired_token_is_reported_as_expired() {
        let service = test_service();
        let now = Utc::now();
        let claims = AccessTokenClaims {
            subject_id: Uuid::new_v4().to_string(),
            role: "user".to_string(),
            iat: (now - Duration::hours(3)).timestamp(),
            exp: (now - Duration::hours(2)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret-not-for-production"),
        )
        .expect("encode");

        assert_eq!(
            service.verify_access_token(&token),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let service = test_service();
        let other = JwtService::new(&JwtConfig {
            secret: "a-different-secret".to_string(),
            access_token_expiry_minutes: 60,
            refresh_token_expiry_days: 7,
        });

        let token = other
            .issue_access_token(&Uuid::new_v4().to_string(), Role::User)
            .expect("issue");

        assert_eq!(
            service.verify_access_token(&token),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_rotate_mints_fresh_access_token() {
        let service = test_service();
        let subject = Uuid::new_v4().to_string();
        let refresh = service.issue_refresh_token(&subject).expect("issue");

        let access = service.rotate(&refresh, Role::User).expect("rotate");
        let claims = service.verify_access_token(&access).expect("verify");
        assert_eq!(claims.subject_id, subject);
        assert_eq!(claims.role(), Role::User);
    }

    #[test]
    fn test_rotate_rejects_access_token() {
        let service = test_service();
        let access = service
            .issue_access_token(&Uuid::new_v4().to_string(), Role::User)
            .expect("issue");

        assert!(service.rotate(&access, Role::User).is_err());
    }
}
