use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use super::composer::EmailComposer;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::EmailTemplate;
use crate::domain::user::ports::EmailSender;
use crate::user::errors::EmailDispatchError;

pub const MAILJET_SEND_URL: &str = "https://api.mailjet.com/v3.1/send";

/// Delivers email through the Mailjet v3.1 send API.
pub struct MailjetEmailSender {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    api_secret: String,
    sender: String,
    sender_name: String,
    composer: EmailComposer,
}

impl MailjetEmailSender {
    /// Build a sender whose requests are bounded by `timeout`.
    ///
    /// # Errors
    /// * `InvalidRequest` - HTTP client could not be built
    pub fn new(
        api_key: String,
        api_secret: String,
        sender: String,
        sender_name: String,
        timeout: Duration,
        composer: EmailComposer,
    ) -> Result<Self, EmailDispatchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmailDispatchError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: MAILJET_SEND_URL.to_string(),
            api_key,
            api_secret,
            sender,
            sender_name,
            composer,
        })
    }

    /// Point the sender at another send endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendRequest<'a> {
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Message<'a> {
    from: Contact<'a>,
    to: [Contact<'a>; 1],
    subject: &'a str,
    text_part: &'a str,
    #[serde(rename = "HTMLPart")]
    html_part: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Contact<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[async_trait]
impl EmailSender for MailjetEmailSender {
    async fn send(
        &self,
        to: &EmailAddress,
        template: EmailTemplate,
        link: &str,
    ) -> Result<(), EmailDispatchError> {
        let email = self.composer.compose(template, link);

        let body = SendRequest {
            messages: [Message {
                from: Contact {
                    email: &self.sender,
                    name: Some(&self.sender_name),
                },
                to: [Contact {
                    email: to.as_str(),
                    name: None,
                }],
                subject: &email.subject,
                text_part: &email.text,
                html_part: &email.html,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmailDispatchError::Timeout(e.to_string())
                } else {
                    EmailDispatchError::ConnectionFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EmailDispatchError::Rejected(format!(
                "status {}: {}",
                status, detail
            )));
        }

        tracing::debug!(to = %to, status = status.as_u16(), "Mailjet accepted message");

        Ok(())
    }
}
