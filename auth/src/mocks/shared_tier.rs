//! Mock shared code tier for testing.

use crate::error::{AuthError, Result};
use crate::providers::{ConsumeOutcome, SharedCodeTier};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use wayfarer_core::environment::Clock;

/// In-memory stand-in for Redis.
///
/// TTLs are evaluated against the injected clock. [`set_failing`] makes
/// every operation return `AuthError::CacheError`, simulating an outage.
/// Clones share state.
///
/// [`set_failing`]: MockSharedTier::set_failing
#[derive(Clone)]
pub struct MockSharedTier {
    entries: Arc<Mutex<HashMap<String, (String, DateTime<Utc>)>>>,
    failing: Arc<AtomicBool>,
    clock: Arc<dyn Clock>,
}

impl MockSharedTier {
    /// Create an empty, healthy tier.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            failing: Arc::new(AtomicBool::new(false)),
            clock,
        }
    }

    /// Create a tier that fails every operation.
    #[must_use]
    pub fn always_failing(clock: Arc<dyn Clock>) -> Self {
        let tier = Self::new(clock);
        tier.set_failing(true);
        tier
    }

    /// Toggle the simulated outage.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Entries held, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    /// `true` if nothing is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries that have not expired.
    #[must_use]
    pub fn live_len(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .lock()
            .map_or(0, |entries| entries.values().filter(|(_, exp)| *exp > now).count())
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(AuthError::CacheError("mock shared tier unavailable".to_string()))
        } else {
            Ok(())
        }
    }

    fn with_entries<T>(
        &self,
        f: impl FnOnce(&mut HashMap<String, (String, DateTime<Utc>)>, DateTime<Utc>) -> T,
    ) -> Result<T> {
        self.check()?;
        let now = self.clock.now();
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AuthError::InternalError("lock poisoned".to_string()))?;
        Ok(f(&mut entries, now))
    }
}

impl std::fmt::Debug for MockSharedTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSharedTier")
            .field("entries", &self.len())
            .field("failing", &self.failing.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

fn live(entry: Option<&(String, DateTime<Utc>)>, now: DateTime<Utc>) -> Option<&String> {
    entry.filter(|(_, exp)| *exp > now).map(|(value, _)| value)
}

impl SharedCodeTier for MockSharedTier {
    fn set(&self, key: &str, value: &str, ttl_secs: u64) -> impl Future<Output = Result<()>> + Send {
        let result = self.with_entries(|entries, now| {
            let expires_at = i64::try_from(ttl_secs)
                .ok()
                .and_then(Duration::try_seconds)
                .and_then(|ttl| now.checked_add_signed(ttl))
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            entries.insert(key.to_string(), (value.to_string(), expires_at));
        });
        async move { result }
    }

    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send {
        let result = self.with_entries(|entries, now| live(entries.get(key), now).cloned());
        async move { result }
    }

    fn delete(&self, key: &str) -> impl Future<Output = Result<()>> + Send {
        let result = self.with_entries(|entries, _| {
            entries.remove(key);
        });
        async move { result }
    }

    fn compare_and_delete(
        &self,
        key: &str,
        expected: &str,
    ) -> impl Future<Output = Result<ConsumeOutcome>> + Send {
        let result = self.with_entries(|entries, now| {
            let outcome = match live(entries.get(key), now) {
                None => ConsumeOutcome::Absent,
                Some(value) if value == expected => ConsumeOutcome::Consumed,
                Some(_) => ConsumeOutcome::Mismatch,
            };
            if outcome == ConsumeOutcome::Consumed {
                entries.remove(key);
            }
            outcome
        });
        async move { result }
    }
}
