//! Error types for authentication and account operations.

use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Comprehensive error taxonomy for authentication.
///
/// Variants fall into four groups: validation, state conflicts, credential
/// failures and infrastructure. Only the last group is opaque to users; the
/// others carry a stable discriminator (see [`AuthError::code`]) that clients
/// may branch on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Validation Errors
    // ═══════════════════════════════════════════════════════════

    /// Email address is malformed.
    #[error("Invalid email address")]
    InvalidEmail,

    /// Request field failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ═══════════════════════════════════════════════════════════
    // State Conflicts
    // ═══════════════════════════════════════════════════════════

    /// A full (non-guest) account already uses this email.
    #[error("An account with this email already exists")]
    AlreadyRegistered,

    /// No account exists for the login being completed.
    #[error("User not found")]
    UserNotFound,

    /// The account targeted by an upgrade does not exist.
    #[error("Account not found")]
    NotFound,

    // ═══════════════════════════════════════════════════════════
    // Credential Errors
    // ═══════════════════════════════════════════════════════════

    /// A code is pending but the submitted one does not match.
    #[error("Invalid verification code")]
    OtpInvalid,

    /// No pending code: never requested, already used, or expired.
    #[error("Verification code has expired or is invalid")]
    OtpExpiredOrInvalid,

    /// Session token failed signature or claim validation.
    #[error("Invalid or expired session token")]
    InvalidToken,

    /// Credentials were reset after the session token was issued.
    #[error("Credentials changed after this session was issued")]
    CredentialsChanged,

    /// Google rejected the identity assertion.
    #[error("Google identity token rejected: {0}")]
    GoogleTokenInvalid(String),

    // ═══════════════════════════════════════════════════════════
    // Infrastructure Errors
    // ═══════════════════════════════════════════════════════════

    /// An optional provider was not configured at startup.
    #[error("Authentication provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Shared cache operation failed.
    #[error("Cache error: {0}")]
    CacheError(String),

    /// Email delivery failed.
    #[error("Email error: {0}")]
    EmailError(String),

    /// Serialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Internal server error (should not be exposed to users).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    /// Returns `true` if this error is an expected business outcome the
    /// caller can act on, as opposed to an infrastructure failure.
    ///
    /// # Examples
    ///
    /// ```
    /// # use wayfarer_auth::AuthError;
    /// assert!(AuthError::OtpInvalid.is_user_error());
    /// assert!(!AuthError::DatabaseError("down".into()).is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        !matches!(
            self,
            Self::ProviderNotConfigured(_)
                | Self::DatabaseError(_)
                | Self::CacheError(_)
                | Self::EmailError(_)
                | Self::SerializationError(_)
                | Self::InternalError(_)
        )
    }

    /// Stable machine-readable discriminator.
    ///
    /// # Examples
    ///
    /// ```
    /// # use wayfarer_auth::AuthError;
    /// assert_eq!(AuthError::AlreadyRegistered.code(), "ALREADY_REGISTERED");
    /// assert_eq!(AuthError::OtpExpiredOrInvalid.code(), "OTP_EXPIRED_OR_INVALID");
    /// ```
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidEmail | Self::InvalidInput(_) => "VALIDATION_ERROR",
            Self::AlreadyRegistered => "ALREADY_REGISTERED",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",
            Self::OtpInvalid => "OTP_INVALID",
            Self::OtpExpiredOrInvalid => "OTP_EXPIRED_OR_INVALID",
            Self::InvalidToken | Self::CredentialsChanged | Self::GoogleTokenInvalid(_) => {
                "UNAUTHORIZED"
            }
            Self::ProviderNotConfigured(_) => "SERVICE_UNAVAILABLE",
            Self::DatabaseError(_)
            | Self::CacheError(_)
            | Self::EmailError(_)
            | Self::SerializationError(_)
            | Self::InternalError(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_errors_are_distinct() {
        assert_ne!(AuthError::OtpInvalid, AuthError::OtpExpiredOrInvalid);
        assert_ne!(
            AuthError::OtpInvalid.code(),
            AuthError::OtpExpiredOrInvalid.code()
        );
    }

    #[test]
    fn test_infrastructure_errors_are_not_user_errors() {
        for err in [
            AuthError::CacheError("timeout".into()),
            AuthError::EmailError("smtp".into()),
            AuthError::InternalError("boom".into()),
        ] {
            assert!(!err.is_user_error(), "{err} should be internal");
            assert_eq!(err.code(), "INTERNAL_SERVER_ERROR");
        }
    }

    #[test]
    fn test_state_conflicts_are_user_errors() {
        assert!(AuthError::AlreadyRegistered.is_user_error());
        assert!(AuthError::UserNotFound.is_user_error());
        assert!(AuthError::NotFound.is_user_error());
    }
}
