//! Outbound account e-mail.
//!
//! Delivery is behind [`Mailer`] so a real provider can be plugged in; the
//! bundled [`LogMailer`] writes each message to the log instead of sending it.

use async_trait::async_trait;
use tracing::info;

use crate::utils::AppResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl MailMessage {
    pub fn verification(to: &str, token: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Verify your email address".to_string(),
            body: format!("Use this token to verify your account: {token}"),
        }
    }

    pub fn password_reset(to: &str, token: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Reset your password".to_string(),
            body: format!("Use this token to choose a new password: {token}"),
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> AppResult<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> AppResult<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "Email (log delivery)"
        );
        Ok(())
    }
}
