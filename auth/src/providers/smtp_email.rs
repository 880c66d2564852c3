//! SMTP email provider implementation using Lettre.

use crate::error::{AuthError, Result};
use crate::providers::EmailProvider;
use crate::providers::email::otp_subject;
use crate::state::OtpPurpose;
use chrono::{DateTime, Utc};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// SMTP email provider using Lettre.
///
/// This provider sends real emails via SMTP, suitable for production use.
///
/// # Configuration
///
/// - `smtp_server`: SMTP server address (e.g., "smtp.gmail.com")
/// - `smtp_port`: SMTP server port (usually 587 for STARTTLS, 465 for TLS)
/// - `smtp_username`: SMTP authentication username
/// - `smtp_password`: SMTP authentication password
/// - `from_email`: Sender email address
/// - `from_name`: Sender display name
///
/// # Examples
///
/// ```ignore
/// use wayfarer_auth::providers::SmtpEmailProvider;
///
/// let provider = SmtpEmailProvider::new(
///     "smtp.gmail.com",
///     587,
///     "user@gmail.com".to_string(),
///     "app_password".to_string(),
///     "noreply@wayfarer.travel".to_string(),
///     "Wayfarer".to_string(),
/// )?;
/// ```
#[derive(Clone)]
pub struct SmtpEmailProvider {
    /// Pooled async transport.
    mailer: AsyncSmtpTransport<Tokio1Executor>,

    /// Sender email address.
    from_email: String,

    /// Sender display name.
    from_name: String,
}

impl SmtpEmailProvider {
    /// Create a new SMTP email provider.
    ///
    /// # Errors
    ///
    /// Returns error if the relay address is invalid.
    pub fn new(
        smtp_server: &str,
        smtp_port: u16,
        smtp_username: String,
        smtp_password: String,
        from_email: String,
        from_name: String,
    ) -> Result<Self> {
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_server)
            .map_err(|e| AuthError::EmailError(format!("SMTP relay error: {e}")))?
            .port(smtp_port)
            .credentials(Credentials::new(smtp_username, smtp_password))
            .build();

        Ok(Self {
            mailer,
            from_email,
            from_name,
        })
    }

    /// Build the "From" header.
    fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    async fn send_html(&self, to: &str, subject: &str, html_body: String) -> Result<()> {
        let email = Message::builder()
            .from(
                self.from_header()
                    .parse()
                    .map_err(|e| AuthError::EmailError(format!("Invalid from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| AuthError::EmailError(format!("Invalid to address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body)
            .map_err(|e| AuthError::EmailError(format!("Failed to build email: {e}")))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| AuthError::EmailError(format!("Failed to send email: {e}")))?;

        Ok(())
    }
}

impl std::fmt::Debug for SmtpEmailProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpEmailProvider")
            .field("from_email", &self.from_email)
            .field("from_name", &self.from_name)
            .finish_non_exhaustive()
    }
}

impl EmailProvider for SmtpEmailProvider {
    async fn send_otp(
        &self,
        to: &str,
        purpose: OtpPurpose,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let expires_minutes = (expires_at - Utc::now()).num_minutes().max(1);
        let label = purpose.label();

        let html_body = format!(
            r#"
<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Your verification code</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2 style="color: #2563eb;">Your {label} code</h2>
        <p>Enter this code to continue. It expires in {expires_minutes} minutes.</p>
        <p style="margin: 30px 0; font-size: 32px; letter-spacing: 8px; font-weight: bold;">
            {code}
        </p>
        <p style="color: #666; font-size: 14px;">
            If you didn't request this code, you can safely ignore this email.
        </p>
    </div>
</body>
</html>
            "#
        );

        self.send_html(to, &otp_subject(purpose), html_body).await
    }

    async fn send_welcome(&self, to: &str, name: &str) -> Result<()> {
        let html_body = format!(
            r#"
<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Welcome to Wayfarer</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2 style="color: #2563eb;">Welcome aboard, {name}!</h2>
        <p>Your account is ready. Your bookings and saved travellers are now in one place.</p>
    </div>
</body>
</html>
            "#
        );

        self.send_html(to, "Welcome to Wayfarer", html_body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_recipient_is_email_error() {
        let Ok(provider) = SmtpEmailProvider::new(
            "localhost",
            2525,
            "user".into(),
            "pass".into(),
            "noreply@wayfarer.test".into(),
            "Wayfarer".into(),
        ) else {
            return;
        };

        let result = provider.send_welcome("not an address", "Jane").await;

        assert!(matches!(result, Err(AuthError::EmailError(_))));
    }
}
