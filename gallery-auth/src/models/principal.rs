//! Principal model - the authenticated actors of the gallery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Principal role codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

/// Principal entity.
///
/// Durable persistence belongs to the surrounding platform; the auth core
/// reads and writes `active`, `email_verified`, `password_hash` and
/// `google_id` through the `PrincipalRepository` seam.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    /// None for OAuth-created accounts until a password is set via reset.
    pub password_hash: Option<String>,
    pub role_code: String,
    pub active: bool,
    pub email_verified: bool,
    /// External identity linkage. Set once, never overwritten.
    pub google_id: Option<String>,
    pub avatar_url: Option<String>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl Principal {
    /// Create a new password-based principal.
    pub fn new(email: String, password_hash: String, display_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: Uuid::new_v4(),
            email,
            display_name,
            password_hash: Some(password_hash),
            role_code: Role::User.as_str().to_string(),
            active: true,
            email_verified: false,
            google_id: None,
            avatar_url: None,
            created_utc: now,
            updated_utc: now,
        }
    }

    /// Create a principal from an external identity provider.
    ///
    /// Provider emails are treated as pre-verified.
    pub fn from_external_identity(
        google_id: String,
        email: String,
        display_name: Option<String>,
        avatar_url: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id: Uuid::new_v4(),
            email,
            display_name,
            password_hash: None,
            role_code: Role::User.as_str().to_string(),
            active: true,
            email_verified: true,
            google_id: Some(google_id),
            avatar_url,
            created_utc: now,
            updated_utc: now,
        }
    }

    pub fn role(&self) -> Role {
        Role::parse(&self.role_code)
    }

    /// Convert to sanitized response (no credential material).
    pub fn sanitized(&self) -> PrincipalResponse {
        PrincipalResponse::from(self.clone())
    }
}

/// Lightweight principal view consumed by the access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl From<&Principal> for Actor {
    fn from(p: &Principal) -> Self {
        Self {
            user_id: p.user_id,
            role: p.role(),
        }
    }
}

/// Principal response for API (without sensitive fields).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PrincipalResponse {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub active: bool,
    pub email_verified: bool,
    pub avatar_url: Option<String>,
    pub created_utc: DateTime<Utc>,
}

impl From<Principal> for PrincipalResponse {
    fn from(p: Principal) -> Self {
        let role = p.role();
        Self {
            user_id: p.user_id,
            email: p.email,
            display_name: p.display_name,
            role,
            active: p.active,
            email_verified: p.email_verified,
            avatar_url: p.avatar_url,
            created_utc: p.created_utc,
        }
    }
}
