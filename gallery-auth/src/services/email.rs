use gallery_core::axum::async_trait;
use gallery_core::error::AppError;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials, Message,
    SmtpTransport, Transport,
};
use std::sync::Mutex;
use std::time::Duration;

use crate::models::OtpPurpose;

/// Outbound email collaborator for passcode delivery.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send_otp_email(
        &self,
        to_email: &str,
        purpose: &OtpPurpose,
        code: &str,
    ) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct SmtpEmailService {
    mailer: SmtpTransport,
    from_address: String,
}

impl SmtpEmailService {
    pub fn new(config: &crate::config::SmtpConfig) -> Result<Self, AppError> {
        let creds = Credentials::new(config.user.clone(), config.password.clone());

        let mailer = SmtpTransport::relay(&config.host)
            .map_err(|e| AppError::InternalError(anyhow::anyhow!(e.to_string())))?
            .credentials(creds)
            .port(587)
            .timeout(Some(Duration::from_secs(10)))
            .build();

        tracing::info!(host = %config.host, "Email service initialized");

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        plain_body: &str,
        html_body: &str,
    ) -> Result<(), AppError> {
        let email = Message::builder()
            .from(self.from_address.parse().map_err(
                |e: lettre::address::AddressError| AppError::InternalError(e.into()),
            )?)
            .to(to_email.parse().map_err(
                |e: lettre::address::AddressError| AppError::InternalError(e.into()),
            )?)
            .subject(subject)
            .multipart(
                lettre::message::MultiPart::alternative()
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(plain_body.to_string()),
                    )
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| AppError::InternalError(e.into()))?;

        // Send email in blocking thread pool to avoid blocking async runtime
        let mailer = self.mailer.clone();
        let result = tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::InternalError(e.into()))?;

        match result {
            Ok(_) => {
                tracing::info!(
                    to = %to_email,
                    subject = %subject,
                    "Email sent successfully"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    error = %e.to_string(),
                    to = %to_email,
                    "Failed to send email"
                );
                Err(AppError::EmailError(e.to_string()))
            }
        }
    }
}

fn subject_for(purpose: &OtpPurpose) -> &'static str {
    match purpose {
        OtpPurpose::Registration => "Confirm your gallery account",
        OtpPurpose::ForgotPassword => "Reset your password",
        OtpPurpose::Verification => "Your verification code",
    }
}

fn intro_for(purpose: &OtpPurpose) -> &'static str {
    match purpose {
        OtpPurpose::Registration => {
            "Welcome! Use the code below to confirm your email address."
        }
        OtpPurpose::ForgotPassword => {
            "We received a request to reset your password. Use the code below to continue."
        }
        OtpPurpose::Verification => "Use the code below to verify this address.",
    }
}

#[async_trait]
impl EmailProvider for SmtpEmailService {
    async fn send_otp_email(
        &self,
        to_email: &str,
        purpose: &OtpPurpose,
        code: &str,
    ) -> Result<(), AppError> {
        let subject = subject_for(purpose);
        let intro = intro_for(purpose);

        let html_body = format!(
            r###"            <html>
                <body style="font-family: Arial, sans-serif;">
                    <h2>{}</h2>
                    <p>{}</p>
                    <p style="font-size: 28px; letter-spacing: 6px; font-weight: bold;">{}</p>
                    <p style="color: #666; font-size: 12px;">
                        This code expires in 10 minutes. If you didn't request it, please ignore this email.
                    </p>
                </body>
            </html>
            "###,
            subject, intro, code
        );

        let plain_body = format!(
            "{}\n\n{}\n\nYour code: {}\n\nThis code expires in 10 minutes. If you didn't request it, please ignore this email.",
            subject, intro, code
        );

        self.send_email(to_email, subject, &plain_body, &html_body)
            .await
    }
}

/// Recorded message from the mock provider.
#[derive(Debug, Clone)]
pub struct OutboxEntry {
    pub to: String,
    pub purpose: OtpPurpose,
    pub code: String,
}

/// Mock provider for tests: records every dispatch instead of sending.
#[derive(Default)]
pub struct MockEmailService {
    outbox: Mutex<Vec<OutboxEntry>>,
    fail_sends: std::sync::atomic::AtomicBool,
}

impl MockEmailService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail, to exercise dispatch-failure paths.
    pub fn set_failing(&self, failing: bool) {
        self.fail_sends
            .store(failing, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn outbox(&self) -> Vec<OutboxEntry> {
        self.outbox.lock().expect("outbox poisoned").clone()
    }

    pub fn last_code_for(&self, to: &str) -> Option<String> {
        self.outbox
            .lock()
            .expect("outbox poisoned")
            .iter()
            .rev()
            .find(|e| e.to == to)
            .map(|e| e.code.clone())
    }
}

#[async_trait]
impl EmailProvider for MockEmailService {
    async fn send_otp_email(
        &self,
        to_email: &str,
        purpose: &OtpPurpose,
        code: &str,
    ) -> Result<(), AppError> {
        if self.fail_sends.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(AppError::EmailError("simulated send failure".to_string()));
        }
        self.outbox.lock().expect("outbox poisoned").push(OutboxEntry {
            to: to_email.to_string(),
            purpose: *purpose,
            code: code.to_string(),
        });
        Ok(())
    }
}
