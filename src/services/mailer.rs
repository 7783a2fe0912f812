use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

/// A plain-text message ready for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutgoingEmail {
    pub fn mfa_code(to: &str, code: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Your sign-in code".to_string(),
            body: format!(
                "Your verification code is {}.\n\nIt expires in 10 minutes. If you did not try to sign in, you can ignore this email.",
                code
            ),
        }
    }

    pub fn otp(to: &str, code: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Verify your email address".to_string(),
            body: format!(
                "Your one-time password is {}.\n\nIt expires in 10 minutes.",
                code
            ),
        }
    }

    pub fn practitioner_link(to: &str, link: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Your practitioner login link".to_string(),
            body: format!(
                "Use the link below to sign in. It is valid for 10 minutes.\n\n{}",
                link
            ),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Provider rejected message: {0}")]
    Rejected(String),
}

/// Out-of-band delivery channel for codes and links.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

/// SendGrid v3 mail API.
pub struct SendGridMailer {
    client: Client,
    api_key: String,
    from: String,
    base_url: String,
}

impl SendGridMailer {
    pub fn new(api_key: String, from: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            from,
            base_url: "https://api.sendgrid.com".to_string(),
        }
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let body = json!({
            "personalizations": [{
                "to": [{"email": email.to}]
            }],
            "from": {"email": self.from},
            "subject": email.subject,
            "content": [{
                "type": "text/plain",
                "value": email.body
            }]
        });

        let response = self
            .client
            .post(format!("{}/v3/mail/send", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MailError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected(format!("{}: {}", status, detail)));
        }

        tracing::debug!(to = %email.to, subject = %email.subject, "email dispatched");
        Ok(())
    }
}

/// Development mailer: writes messages to the log instead of sending them.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        tracing::info!(to = %email.to, subject = %email.subject, body = %email.body, "email not sent (no provider configured)");
        Ok(())
    }
}
