//! Authentication configuration.
//!
//! Configuration values should be provided by the application, not hardcoded.
//! Every struct has a sensible `Default` and `with_*` builders.

use crate::constants::{otp, session};
use chrono::Duration;

/// One-time code configuration.
#[derive(Debug, Clone)]
pub struct OtpConfig {
    /// Code time-to-live.
    ///
    /// Default: 900 seconds
    pub code_ttl: Duration,

    /// Return infrastructure error details to clients.
    ///
    /// Only enable in development. Default: `false`
    pub expose_internal_errors: bool,
}

impl OtpConfig {
    /// Create OTP configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set code time-to-live.
    #[must_use]
    pub const fn with_code_ttl(mut self, ttl: Duration) -> Self {
        self.code_ttl = ttl;
        self
    }

    /// Expose internal error messages (development mode).
    #[must_use]
    pub const fn with_expose_internal_errors(mut self, expose: bool) -> Self {
        self.expose_internal_errors = expose;
        self
    }

    /// Code TTL in whole seconds, as the shared cache expects it.
    #[must_use]
    pub fn code_ttl_secs(&self) -> u64 {
        u64::try_from(self.code_ttl.num_seconds()).unwrap_or(900)
    }
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_ttl: Duration::seconds(otp::CODE_TTL_SECS),
            expose_internal_errors: false,
        }
    }
}

/// Session token configuration.
#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC secret used to sign session tokens.
    pub secret: String,

    /// Token lifetime.
    ///
    /// Default: 90 days
    pub ttl: Duration,
}

impl TokenConfig {
    /// Create token configuration.
    ///
    /// # Arguments
    ///
    /// * `secret` - HMAC signing secret (keep it out of source control)
    #[must_use]
    pub const fn new(secret: String) -> Self {
        Self {
            secret,
            ttl: Duration::days(session::DEFAULT_TOKEN_TTL_DAYS),
        }
    }

    /// Set token lifetime.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Session cookie configuration.
#[derive(Debug, Clone)]
pub struct SessionCookieConfig {
    /// Cookie name.
    ///
    /// Default: `jwt`
    pub name: String,

    /// Cookie lifetime in days.
    ///
    /// Default: 90
    pub max_age_days: i64,

    /// Set the `Secure` attribute.
    ///
    /// Default: `true`
    pub secure: bool,
}

impl SessionCookieConfig {
    /// Create cookie configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set cookie name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set cookie lifetime in days.
    #[must_use]
    pub const fn with_max_age_days(mut self, days: i64) -> Self {
        self.max_age_days = days;
        self
    }

    /// Set the `Secure` attribute.
    #[must_use]
    pub const fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Max-Age in seconds.
    #[must_use]
    pub const fn max_age_secs(&self) -> i64 {
        self.max_age_days.saturating_mul(24 * 60 * 60)
    }
}

impl Default for SessionCookieConfig {
    fn default() -> Self {
        Self {
            name: session::DEFAULT_COOKIE_NAME.to_string(),
            max_age_days: session::DEFAULT_COOKIE_MAX_AGE_DAYS,
            secure: true,
        }
    }
}

/// Code store configuration.
#[derive(Debug, Clone)]
pub struct CodeStoreConfig {
    /// Upper bound on any single shared-tier operation.
    ///
    /// Default: 2 seconds
    pub shared_op_timeout: std::time::Duration,

    /// TTL of the availability probe key in seconds.
    ///
    /// Default: 5
    pub probe_ttl_secs: u64,

    /// Maximum number of entries held by the local fallback tier.
    ///
    /// Default: 10,000
    pub local_max_entries: usize,

    /// Interval between background sweeps of the local tier.
    ///
    /// Default: 60 seconds
    pub sweep_interval: std::time::Duration,
}

impl CodeStoreConfig {
    /// Create code store configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set shared-tier operation timeout.
    #[must_use]
    pub const fn with_shared_op_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.shared_op_timeout = timeout;
        self
    }

    /// Set probe key TTL.
    #[must_use]
    pub const fn with_probe_ttl_secs(mut self, secs: u64) -> Self {
        self.probe_ttl_secs = secs;
        self
    }

    /// Set local tier capacity.
    #[must_use]
    pub const fn with_local_max_entries(mut self, max: usize) -> Self {
        self.local_max_entries = max;
        self
    }

    /// Set background sweep interval.
    #[must_use]
    pub const fn with_sweep_interval(mut self, interval: std::time::Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}

impl Default for CodeStoreConfig {
    fn default() -> Self {
        Self {
            shared_op_timeout: std::time::Duration::from_secs(2),
            probe_ttl_secs: 5,
            local_max_entries: 10_000,
            sweep_interval: std::time::Duration::from_secs(60),
        }
    }
}
