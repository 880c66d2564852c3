//! Authentication constants.
//!
//! Values shared by the OTP manager, the code store and the HTTP layer.

/// One-time code parameters.
pub mod otp {
    /// Lifetime of a one-time code in seconds (15 minutes).
    pub const CODE_TTL_SECS: i64 = 900;

    /// Number of ASCII digits in a one-time code.
    pub const CODE_LENGTH: usize = 6;

    /// Smallest generated code. Verification still accepts any six digits.
    pub const CODE_MIN: u32 = 100_000;

    /// Largest generated code.
    pub const CODE_MAX: u32 = 999_999;
}

/// Shared-cache key layout.
///
/// Full key format: `otp:{purpose}:{email}` (e.g. `otp:register:jane@example.com`).
pub mod keys {
    /// Prefix for pending one-time codes.
    pub const OTP_PREFIX: &str = "otp";

    /// Prefix for availability probe keys: `otp:probe:{uuid}`.
    pub const PROBE_PREFIX: &str = "otp:probe";
}

/// Session token parameters.
pub mod session {
    /// Default session token lifetime in days.
    pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 90;

    /// Default session cookie name.
    pub const DEFAULT_COOKIE_NAME: &str = "jwt";

    /// Default session cookie lifetime in days.
    pub const DEFAULT_COOKIE_MAX_AGE_DAYS: i64 = 90;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_range_is_six_digits() {
        assert_eq!(otp::CODE_MIN.to_string().len(), otp::CODE_LENGTH);
        assert_eq!(otp::CODE_MAX.to_string().len(), otp::CODE_LENGTH);
    }

    #[test]
    fn test_code_ttl_is_fifteen_minutes() {
        assert_eq!(otp::CODE_TTL_SECS, 15 * 60);
    }
}
