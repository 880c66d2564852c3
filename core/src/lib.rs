//! # Wayfarer Core
//!
//! Environment traits shared by every Wayfarer crate.
//!
//! All external dependencies are abstracted behind traits and injected, so the
//! authentication logic can run against real infrastructure in production and
//! against deterministic fakes in tests.

// Re-export commonly used types
pub use chrono::{DateTime, Utc};

/// Environment module - injected dependencies
///
/// Time is the one dependency every component needs: code expiry, token
/// issuance and the local fallback tier all read the clock through this trait
/// so tests can move time forward without sleeping.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use wayfarer_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let before = clock.now();
    /// assert!(clock.now() >= before);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
