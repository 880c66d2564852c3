//! Email delivery chosen at startup.

use crate::config::EmailConfig;
use chrono::{DateTime, Utc};
use wayfarer_auth::Result;
use wayfarer_auth::providers::{ConsoleEmailProvider, EmailProvider, SmtpEmailProvider};
use wayfarer_auth::state::OtpPurpose;

/// SMTP when a relay is configured, console output otherwise.
#[derive(Clone)]
pub enum AppEmailProvider {
    /// Print messages to stdout.
    Console(ConsoleEmailProvider),
    /// Deliver through an SMTP relay.
    Smtp(SmtpEmailProvider),
}

impl AppEmailProvider {
    /// Build the provider described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP relay address is invalid.
    pub fn from_config(config: &EmailConfig) -> Result<Self> {
        match &config.smtp {
            Some(smtp) => Ok(Self::Smtp(SmtpEmailProvider::new(
                &smtp.host,
                smtp.port,
                smtp.username.clone(),
                smtp.password.clone(),
                config.from_email.clone(),
                config.from_name.clone(),
            )?)),
            None => Ok(Self::Console(ConsoleEmailProvider::new())),
        }
    }

    /// Short name for startup logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Console(_) => "console",
            Self::Smtp(_) => "smtp",
        }
    }
}

impl EmailProvider for AppEmailProvider {
    async fn send_otp(
        &self,
        to: &str,
        purpose: OtpPurpose,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        match self {
            Self::Console(p) => p.send_otp(to, purpose, code, expires_at).await,
            Self::Smtp(p) => p.send_otp(to, purpose, code, expires_at).await,
        }
    }

    async fn send_welcome(&self, to: &str, name: &str) -> Result<()> {
        match self {
            Self::Console(p) => p.send_welcome(to, name).await,
            Self::Smtp(p) => p.send_welcome(to, name).await,
        }
    }
}
