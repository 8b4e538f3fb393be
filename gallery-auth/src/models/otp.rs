//! OTP record model - one-time passcode state per subject.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// OTP purpose codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    Registration,
    ForgotPassword,
    Verification,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::Registration => "registration",
            OtpPurpose::ForgotPassword => "forgot_password",
            OtpPurpose::Verification => "verification",
        }
    }
}

/// In-memory OTP record, keyed externally by normalized subject email.
///
/// At most one live record exists per subject; a new `generate` replaces it.
#[derive(Debug, Clone)]
pub struct OtpRecord {
    /// SHA-256 hex of the numeric code. The plaintext code is never stored.
    pub code_hash: String,
    pub purpose: OtpPurpose,
    pub issued_utc: DateTime<Utc>,
    pub expires_utc: DateTime<Utc>,
    pub attempts: u32,
    pub verified: bool,
}

impl OtpRecord {
    pub fn new(code_hash: String, purpose: OtpPurpose, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            code_hash,
            purpose,
            issued_utc: now,
            expires_utc: now + ttl,
            attempts: 0,
            verified: false,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_utc
    }
}

/// Outcome of a single verification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Code matched; the record is now verified.
    Match { purpose: OtpPurpose },
    /// Code mismatched; `remaining` attempts left before lockout.
    Mismatch { remaining: u32 },
    /// Attempt cap reached; the record has been purged.
    Locked,
    /// Record existed but had expired; it has been purged.
    Expired,
    /// No record for this subject.
    NotFound,
}
