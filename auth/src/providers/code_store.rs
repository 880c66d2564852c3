//! One-time code storage traits.
//!
//! Two layers:
//!
//! - [`SharedCodeTier`]: a raw, fallible cache shared by every instance
//!   (Redis in production).
//! - [`CodeStore`]: the infallible facade the OTP manager talks to. The
//!   production implementation ([`crate::stores::TieredCodeStore`]) puts a
//!   local in-process tier behind the shared one so code issuance keeps
//!   working while the cache is down.

use crate::error::Result;

/// Where a `put` landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// Written to the shared tier.
    Stored,
    /// Shared tier failed; written to the local tier of this instance only.
    FellBackToLocal,
    /// Neither tier accepted the write.
    Failed,
}

impl StoreOutcome {
    /// `true` unless the value was dropped.
    #[must_use]
    pub const fn is_stored(&self) -> bool {
        !matches!(self, Self::Failed)
    }
}

/// Result of an atomic compare-and-delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// Value matched and was removed.
    Consumed,
    /// A value is present but differs. It is left in place.
    Mismatch,
    /// Nothing stored under the key (never set, consumed, or expired).
    Absent,
}

/// Shared code tier.
///
/// All operations may fail; callers decide how to degrade.
///
/// # Key Format
///
/// Implementations store values verbatim under the caller's key, e.g.
/// `otp:register:jane@example.com`.
pub trait SharedCodeTier: Send + Sync {
    /// Store `value` under `key` for `ttl_secs` seconds, replacing any
    /// previous value.
    ///
    /// # Errors
    ///
    /// Returns error if the cache is unreachable or rejects the write.
    fn set(
        &self,
        key: &str,
        value: &str,
        ttl_secs: u64,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Fetch the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns error if the cache is unreachable.
    fn get(&self, key: &str) -> impl std::future::Future<Output = Result<Option<String>>> + Send;

    /// Remove `key`.
    ///
    /// # Errors
    ///
    /// Returns error if the cache is unreachable.
    fn delete(&self, key: &str) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Atomically remove `key` if its value equals `expected`.
    ///
    /// The comparison and the delete must happen as a single step: two
    /// concurrent callers with the right value see exactly one `Consumed`.
    ///
    /// # Errors
    ///
    /// Returns error if the cache is unreachable.
    fn compare_and_delete(
        &self,
        key: &str,
        expected: &str,
    ) -> impl std::future::Future<Output = Result<ConsumeOutcome>> + Send;
}

/// Code store used by the OTP manager.
///
/// None of these operations fail: infrastructure errors are logged and
/// folded into the returned value.
pub trait CodeStore: Send + Sync {
    /// Round-trip a throwaway probe key through the shared tier.
    ///
    /// # Returns
    ///
    /// `false` on any error or value mismatch.
    fn is_available(&self) -> impl std::future::Future<Output = bool> + Send;

    /// Store `value` under `key` for `ttl_secs` seconds.
    fn put(
        &self,
        key: &str,
        value: &str,
        ttl_secs: u64,
    ) -> impl std::future::Future<Output = StoreOutcome> + Send;

    /// Fetch a live value.
    fn get(&self, key: &str) -> impl std::future::Future<Output = Option<String>> + Send;

    /// Remove `key` everywhere. Best effort.
    fn delete(&self, key: &str) -> impl std::future::Future<Output = ()> + Send;

    /// Remove `key` if it holds `expected`.
    ///
    /// A mismatch leaves the stored value untouched so the user can retry.
    fn consume(
        &self,
        key: &str,
        expected: &str,
    ) -> impl std::future::Future<Output = ConsumeOutcome> + Send;
}
