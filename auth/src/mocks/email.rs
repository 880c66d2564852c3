//! Mock email provider for testing.

use crate::error::{AuthError, Result};
use crate::providers::EmailProvider;
use crate::state::OtpPurpose;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A captured outgoing email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentEmail {
    /// One-time code.
    Otp {
        /// Recipient.
        to: String,
        /// Flow.
        purpose: OtpPurpose,
        /// Plaintext code.
        code: String,
        /// Expiry shown to the user.
        expires_at: DateTime<Utc>,
    },
    /// Welcome message.
    Welcome {
        /// Recipient.
        to: String,
        /// Display name.
        name: String,
    },
}

/// Mock email provider.
///
/// Records every message instead of sending it, so tests can read the code a
/// user would have received. Clones share the outbox.
#[derive(Debug, Clone, Default)]
pub struct MockEmailProvider {
    sent: Arc<Mutex<Vec<SentEmail>>>,
    should_fail: Arc<AtomicBool>,
}

impl MockEmailProvider {
    /// Create a new mock email provider that succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// All captured emails, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    /// The most recent code sent to `to` for `purpose`.
    #[must_use]
    pub fn last_code(&self, to: &str, purpose: OtpPurpose) -> Option<String> {
        self.sent().into_iter().rev().find_map(|email| match email {
            SentEmail::Otp {
                to: recipient,
                purpose: p,
                code,
                ..
            } if recipient == to && p == purpose => Some(code),
            _ => None,
        })
    }

    /// Number of captured emails.
    #[must_use]
    pub fn count(&self) -> usize {
        self.sent.lock().map_or(0, |sent| sent.len())
    }

    fn record(&self, email: SentEmail) -> Result<()> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(AuthError::EmailError("mock delivery failure".to_string()));
        }
        self.sent
            .lock()
            .map_err(|_| AuthError::InternalError("lock poisoned".to_string()))?
            .push(email);
        Ok(())
    }
}

impl EmailProvider for MockEmailProvider {
    fn send_otp(
        &self,
        to: &str,
        purpose: OtpPurpose,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send {
        let result = self.record(SentEmail::Otp {
            to: to.to_string(),
            purpose,
            code: code.to_string(),
            expires_at,
        });
        async move { result }
    }

    fn send_welcome(&self, to: &str, name: &str) -> impl Future<Output = Result<()>> + Send {
        let result = self.record(SentEmail::Welcome {
            to: to.to_string(),
            name: name.to_string(),
        });
        async move { result }
    }
}
