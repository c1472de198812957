use async_trait::async_trait;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::EmailTemplate;
use crate::domain::user::ports::EmailSender;
use crate::user::errors::EmailDispatchError;

/// Development sender: records the email in the log instead of delivering it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEmailSender;

impl LogEmailSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(
        &self,
        to: &EmailAddress,
        template: EmailTemplate,
        link: &str,
    ) -> Result<(), EmailDispatchError> {
        tracing::info!(
            to = %to,
            template = ?template,
            link = %link,
            "Email provider not configured; email not sent"
        );
        Ok(())
    }
}
