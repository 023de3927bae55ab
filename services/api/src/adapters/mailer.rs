//! services/api/src/adapters/mailer.rs
//!
//! Outbound mail. The auth provider hands verification and reset links to a
//! `Mailer`; the shipped implementation sends through SES.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sesv2::types::{Body as SesBody, Content, Destination, EmailContent, Message};
use aws_sdk_sesv2::Client as SesClient;
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("failed to build mail content: {0}")]
    Content(String),
    #[error("mail send failed: {0}")]
    Send(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError>;
}

/// Sends mail via SES using the default AWS credential chain.
pub struct SesMailer {
    client: SesClient,
    from_address: String,
}

impl SesMailer {
    pub async fn from_env(from_address: String) -> Self {
        let aws_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self {
            client: SesClient::new(&aws_config),
            from_address,
        }
    }
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError> {
        let destination = Destination::builder().to_addresses(to).build();

        let subject_content = Content::builder()
            .data(subject)
            .charset("UTF-8")
            .build()
            .map_err(|e| MailError::Content(format!("failed to build subject: {e}")))?;

        let body_content = Content::builder()
            .data(html_body)
            .charset("UTF-8")
            .build()
            .map_err(|e| MailError::Content(format!("failed to build body: {e}")))?;

        let message = Message::builder()
            .subject(subject_content)
            .body(SesBody::builder().html(body_content).build())
            .build();

        let result = self
            .client
            .send_email()
            .from_email_address(&self.from_address)
            .destination(destination)
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, to = %to, "failed to send email via SES");
                MailError::Send(e.to_string())
            })?;

        info!(to = %to, message_id = ?result.message_id(), "email sent via SES");
        Ok(())
    }
}

//=========================================================================================
// Mail Bodies
//=========================================================================================

pub fn verification_email(display_name: Option<&str>, link: &str) -> String {
    let greeting = display_name.unwrap_or("there");
    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h1 style="color: #8B5CF6;">Welcome to Lifelog</h1>
        <p>Hi {greeting},</p>
        <p>Please confirm your email address to start journaling. The link below
        verifies your account:</p>
        <p><a href="{link}" style="display: inline-block; padding: 12px 24px; background-color: #8B5CF6; color: white; text-decoration: none; border-radius: 5px;">Verify my email</a></p>
        <p>If you did not create a Lifelog account, you can ignore this message.</p>
    </div>
</body>
</html>"#
    )
}

pub fn password_reset_email(display_name: Option<&str>, link: &str) -> String {
    let greeting = display_name.unwrap_or("there");
    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h1 style="color: #8B5CF6;">Reset your password</h1>
        <p>Hi {greeting},</p>
        <p>We received a request to reset your Lifelog password. Follow the link
        below to choose a new one:</p>
        <p><a href="{link}" style="display: inline-block; padding: 12px 24px; background-color: #8B5CF6; color: white; text-decoration: none; border-radius: 5px;">Reset password</a></p>
        <p>If you did not request a reset, no action is needed.</p>
    </div>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mail_bodies_embed_the_link_and_greeting() {
        let body = verification_email(Some("Ada"), "https://lifelog.test/auth/verify?code=abc");
        assert!(body.contains("Hi Ada,"));
        assert!(body.contains("https://lifelog.test/auth/verify?code=abc"));

        let body = password_reset_email(None, "https://lifelog.test/auth/reset?code=xyz");
        assert!(body.contains("Hi there,"));
        assert!(body.contains("https://lifelog.test/auth/reset?code=xyz"));
    }
}
