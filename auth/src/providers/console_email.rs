//! Console email provider for development.

use crate::error::Result;
use crate::providers::EmailProvider;
use crate::providers::email::otp_subject;
use crate::state::OtpPurpose;
use chrono::{DateTime, Utc};
use tracing::info;

/// Console email provider.
///
/// This provider logs emails to the console instead of sending them.
/// Useful for development where you don't want to send real emails.
///
/// # Examples
///
/// ```ignore
/// use wayfarer_auth::providers::ConsoleEmailProvider;
///
/// let provider = ConsoleEmailProvider::new();
/// provider.send_otp(
///     "user@example.com",
///     OtpPurpose::Login,
///     "123456",
///     Utc::now() + chrono::Duration::minutes(15),
/// ).await?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct ConsoleEmailProvider;

impl ConsoleEmailProvider {
    /// Create a new console email provider.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl EmailProvider for ConsoleEmailProvider {
    async fn send_otp(
        &self,
        to: &str,
        purpose: OtpPurpose,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let expires_minutes = (expires_at - Utc::now()).num_minutes();
        let subject = otp_subject(purpose);

        info!(
            to = %to,
            purpose = %purpose,
            code = %code,
            expires_in = %expires_minutes,
            "📧 One-Time Code Email (Development Mode)"
        );
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                   ONE-TIME CODE EMAIL                        ║");
        println!("╠══════════════════════════════════════════════════════════════╣");
        println!("║ To: {to:<57}║");
        println!("║ Subject: {subject:<52}║");
        println!("╠══════════════════════════════════════════════════════════════╣");
        println!("║                                                              ║");
        println!("║ Code: {code:<55}║");
        println!("║ Expires: {expires_at:<52}║");
        println!("║                                                              ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        Ok(())
    }

    async fn send_welcome(&self, to: &str, name: &str) -> Result<()> {
        info!(to = %to, name = %name, "📧 Welcome Email (Development Mode)");
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     WELCOME EMAIL                            ║");
        println!("╠══════════════════════════════════════════════════════════════╣");
        println!("║ To: {to:<57}║");
        println!("║ Welcome aboard, {name:<45}║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_console_provider_never_fails() {
        let provider = ConsoleEmailProvider::new();
        let expires = Utc::now() + chrono::Duration::minutes(15);

        assert!(
            provider
                .send_otp("jane@example.com", OtpPurpose::Register, "042137", expires)
                .await
                .is_ok()
        );
        assert!(provider.send_welcome("jane@example.com", "Jane Doe").await.is_ok());
    }
}
