//! Outbound email
//!
//! - [`SesNotifier`]: Amazon SES v2
//! - [`LogNotifier`]: 只记录日志并保留发件箱 (开发 / 测试)

use async_trait::async_trait;
use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use parking_lot::Mutex;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("Email delivery failed: {0}")]
    Delivery(String),
}

impl From<NotifyError> for AppError {
    fn from(err: NotifyError) -> Self {
        AppError::with_message(ErrorCode::NotifierFailed, err.to_string())
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), NotifyError>;
}

/// Verification email, same wording as the legacy service
pub fn verification_email(code: &str) -> (String, String) {
    (
        "Your Verification Code From NanoFood".to_string(),
        format!("Your verification code is: <b>{code}</b>"),
    )
}

pub struct SesNotifier {
    client: SesClient,
    from: String,
}

impl SesNotifier {
    pub fn new(client: SesClient, from: impl Into<String>) -> Self {
        Self {
            client,
            from: from.into(),
        }
    }
}

#[async_trait]
impl Notifier for SesNotifier {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), NotifyError> {
        let subject = Content::builder()
            .data(subject)
            .build()
            .map_err(|e| NotifyError::Build(e.to_string()))?;
        let html = Content::builder()
            .data(html_body)
            .build()
            .map_err(|e| NotifyError::Build(e.to_string()))?;

        let message = Message::builder()
            .subject(subject)
            .body(Body::builder().html(html).build())
            .build();

        self.client
            .send_email()
            .from_email_address(&self.from)
            .destination(Destination::builder().to_addresses(to).build())
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        tracing::info!(to = to, "Email sent");
        Ok(())
    }
}

/// A message captured by [`LogNotifier`]
#[derive(Debug, Clone, PartialEq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[derive(Debug, Default)]
pub struct LogNotifier {
    outbox: Mutex<Vec<SentMail>>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.outbox.lock().clone()
    }

    /// Last message sent to `to`
    pub fn last_to(&self, to: &str) -> Option<SentMail> {
        self.outbox.lock().iter().rev().find(|m| m.to == to).cloned()
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), NotifyError> {
        tracing::info!(to = to, subject = subject, "Email (log only)");
        self.outbox.lock().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_notifier_keeps_outbox() {
        let notifier = LogNotifier::new();
        let (subject, body) = verification_email("123456");
        notifier.send("a@b.io", &subject, &body).await.unwrap();

        let mail = notifier.last_to("a@b.io").unwrap();
        assert_eq!(mail.subject, "Your Verification Code From NanoFood");
        assert!(mail.html_body.contains("<b>123456</b>"));
        assert!(notifier.last_to("c@d.io").is_none());
    }

    #[test]
    fn test_notify_error_code() {
        let err: AppError = NotifyError::Delivery("smtp down".into()).into();
        assert_eq!(err.code, ErrorCode::NotifierFailed);
    }
}
