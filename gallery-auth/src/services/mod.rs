pub mod auth;
pub mod email;
pub mod error;
pub mod jwt;
pub mod otp_store;
pub mod policy;
pub mod repository;

pub use auth::{AuthService, OAuthProfile};
pub use email::{EmailProvider, MockEmailService, SmtpEmailService};
pub use error::ServiceError;
pub use jwt::{AccessTokenClaims, JwtService, RefreshTokenClaims, TokenError, TokenResponse};
pub use otp_store::{IssuedOtp, OtpStore};
pub use policy::{AccessPolicy, PolicyError};
pub use repository::{MemoryPrincipalStore, PrincipalRepository};
