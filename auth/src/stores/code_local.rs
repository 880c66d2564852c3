//! In-process fallback tier for one-time codes.
//!
//! Only consulted while the shared tier is failing. Entries carry an
//! absolute expiry read from the injected clock; reads treat expired
//! entries as absent. The map is capped: inserts first sweep expired
//! entries and refuse new keys once the cap is still reached.

use crate::providers::ConsumeOutcome;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use wayfarer_core::environment::Clock;

#[derive(Debug, Clone)]
struct LocalEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Bounded in-memory code map with per-entry expiry.
///
/// All methods are synchronous and hold the lock only for the map access,
/// never across an `.await`.
pub struct LocalCodeTier {
    entries: Mutex<HashMap<String, LocalEntry>>,
    clock: Arc<dyn Clock>,
    max_entries: usize,
}

impl LocalCodeTier {
    /// Create an empty tier holding at most `max_entries` live codes.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            max_entries,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, LocalEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `value` for `ttl_secs` seconds.
    ///
    /// # Returns
    ///
    /// `false` if the tier is full of live entries and `key` is new.
    pub fn put(&self, key: &str, value: &str, ttl_secs: u64) -> bool {
        let now = self.clock.now();
        let expires_at = i64::try_from(ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let mut entries = self.lock();

        if !entries.contains_key(key) && entries.len() >= self.max_entries {
            entries.retain(|_, entry| entry.expires_at > now);
            if entries.len() >= self.max_entries {
                tracing::warn!(
                    max_entries = self.max_entries,
                    "Local code tier full; dropping write"
                );
                return false;
            }
        }

        entries.insert(
            key.to_string(),
            LocalEntry {
                value: value.to_string(),
                expires_at,
            },
        );
        true
    }

    /// Fetch a live value. Expired entries are removed on the way.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let mut entries = self.lock();

        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Remove `key`.
    pub fn remove(&self, key: &str) {
        self.lock().remove(key);
    }

    /// Remove `key` if it holds `expected` and has not expired.
    pub fn consume(&self, key: &str, expected: &str) -> ConsumeOutcome {
        let now = self.clock.now();
        let mut entries = self.lock();

        let Some(entry) = entries.get(key) else {
            return ConsumeOutcome::Absent;
        };

        if entry.expires_at <= now {
            entries.remove(key);
            return ConsumeOutcome::Absent;
        }

        if constant_time_eq::constant_time_eq(entry.value.as_bytes(), expected.as_bytes()) {
            entries.remove(key);
            ConsumeOutcome::Consumed
        } else {
            ConsumeOutcome::Mismatch
        }
    }

    /// Drop every expired entry.
    ///
    /// # Returns
    ///
    /// Number of entries removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// Number of entries currently held, live or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// `true` if no entries are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sweep expired entries every `interval` until the handle is aborted.
    #[must_use]
    pub fn spawn_sweeper(self: Arc<Self>, interval: std::time::Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let removed = self.sweep_expired();
                if removed > 0 {
                    tracing::debug!(removed, "Swept expired local codes");
                }
            }
        })
    }
}

impl std::fmt::Debug for LocalCodeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalCodeTier")
            .field("entries", &self.len())
            .field("max_entries", &self.max_entries)
            .finish_non_exhaustive()
    }
}
