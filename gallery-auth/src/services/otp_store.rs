//! In-memory one-time-passcode store.
//!
//! Records are keyed by normalized email. All mutation for a given subject
//! runs under that key's dashmap shard lock, so concurrent verifications can
//! never both read the same attempt count; the lock is released before any
//! email I/O.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::config::OtpConfig;
use crate::models::{OtpPurpose, OtpRecord, VerifyOutcome};
use crate::services::EmailProvider;

/// Result of issuing a passcode.
///
/// The plaintext code is returned to the caller for dispatch bookkeeping and
/// tests; handlers never expose it over the wire.
#[derive(Debug)]
pub struct IssuedOtp {
    pub code: String,
    pub expires_in: i64,
    /// False when the email collaborator failed; the record is live anyway.
    pub sent: bool,
}

pub struct OtpStore {
    records: DashMap<String, OtpRecord>,
    email: Arc<dyn EmailProvider>,
    code_length: usize,
    ttl: chrono::Duration,
    max_attempts: u32,
}

impl OtpStore {
    pub fn new(config: &OtpConfig, email: Arc<dyn EmailProvider>) -> Self {
        Self {
            records: DashMap::new(),
            email,
            code_length: config.code_length,
            ttl: chrono::Duration::minutes(config.ttl_minutes),
            max_attempts: config.max_attempts,
        }
    }

    /// Issue a fresh passcode for `subject`, replacing any prior record, and
    /// dispatch it via email.
    ///
    /// A failed dispatch is reported through `sent = false` and never
    /// disturbs the stored record.
    #[tracing::instrument(skip(self, subject), fields(purpose = purpose.as_str()))]
    pub async fn generate(&self, subject: &str, purpose: OtpPurpose) -> IssuedOtp {
        let subject = normalize_subject(subject);
        let code = generate_code(self.code_length);

        let record = OtpRecord::new(hash_code(&code), purpose, self.ttl);
        let expires_in = self.ttl.num_seconds();
        self.records.insert(subject.clone(), record);

        // Shard lock released above; only the dispatch awaits.
        let sent = match self.email.send_otp_email(&subject, &purpose, &code).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Passcode email dispatch failed");
                false
            }
        };

        IssuedOtp {
            code,
            expires_in,
            sent,
        }
    }

    /// Check `code` against the live record for `subject`.
    ///
    /// The read-increment-compare sequence is a single critical section per
    /// subject key: two racing calls cannot both observe the same attempt
    /// count.
    pub fn verify(&self, subject: &str, code: &str) -> VerifyOutcome {
        let subject = normalize_subject(subject);

        match self.records.entry(subject) {
            Entry::Vacant(_) => VerifyOutcome::NotFound,
            Entry::Occupied(mut entry) => {
                if entry.get().is_expired() {
                    entry.remove();
                    return VerifyOutcome::Expired;
                }

                let submitted = hash_code(code);
                let record = entry.get_mut();
                if submitted
                    .as_bytes()
                    .ct_eq(record.code_hash.as_bytes())
                    .into()
                {
                    record.verified = true;
                    VerifyOutcome::Match {
                        purpose: record.purpose,
                    }
                } else {
                    record.attempts += 1;
                    if record.attempts >= self.max_attempts {
                        entry.remove();
                        VerifyOutcome::Locked
                    } else {
                        let remaining = self.max_attempts - record.attempts;
                        VerifyOutcome::Mismatch { remaining }
                    }
                }
            }
        }
    }

    /// True iff a non-expired record exists with `verified = true`.
    /// Purges the record as a side effect when expiry is detected.
    pub fn is_verified(&self, subject: &str) -> bool {
        let subject = normalize_subject(subject);

        match self.records.entry(subject) {
            Entry::Vacant(_) => false,
            Entry::Occupied(entry) => {
                if entry.get().is_expired() {
                    entry.remove();
                    false
                } else {
                    entry.get().verified
                }
            }
        }
    }

    /// Unconditionally delete the record for `subject`.
    pub fn clear(&self, subject: &str) {
        self.records.remove(&normalize_subject(subject));
    }
}

fn normalize_subject(subject: &str) -> String {
    subject.trim().to_lowercase()
}

/// Generate a random numeric passcode.
fn generate_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| rng.gen_range(0..10).to_string())
        .collect()
}

/// Hash a passcode for storage.
fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}
