//! Email provider trait.

use crate::error::Result;
use crate::state::OtpPurpose;
use chrono::{DateTime, Utc};

/// Email provider.
///
/// This trait abstracts over email delivery (SMTP relay, console output in
/// development, an in-memory capture in tests).
pub trait EmailProvider: Send + Sync {
    /// Send a one-time code.
    ///
    /// # Arguments
    ///
    /// - `to`: Recipient email address
    /// - `purpose`: Flow the code belongs to (drives the subject line)
    /// - `code`: Six-digit plaintext code
    /// - `expires_at`: Code expiration timestamp
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Network request fails
    /// - Email provider rejects the request
    fn send_otp(
        &self,
        to: &str,
        purpose: OtpPurpose,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Send the welcome message after registration completes.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Network request fails
    /// - Email provider rejects the request
    fn send_welcome(
        &self,
        to: &str,
        name: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Subject line for a one-time code email.
#[must_use]
pub fn otp_subject(purpose: OtpPurpose) -> String {
    match purpose {
        OtpPurpose::Register => "Your Wayfarer registration code".to_string(),
        OtpPurpose::Login => "Your Wayfarer sign-in code".to_string(),
        OtpPurpose::Guest => "Your Wayfarer guest checkout code".to_string(),
    }
}
