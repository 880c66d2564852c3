//! Two-tier code store: shared cache first, local map as fallback.
//!
//! # Degraded Mode
//!
//! ```text
//! put     ──▶ shared.set ──ok──▶ Stored (local copy dropped)
//!                 │
//!                 └─err──▶ local.put ──ok──▶ FellBackToLocal
//!                                     └─full─▶ Failed
//!
//! consume ──▶ local.consume
//!                 ├─ Consumed ─▶ Consumed (shared key deleted)
//!                 ├─ Mismatch ─▶ Mismatch
//!                 └─ Absent ───▶ shared.compare_and_delete ─err─▶ Absent
//! ```
//!
//! A successful shared write drops the local copy, so any live local entry
//! was written after the shared one and takes precedence.
//!
//! A code written to the local tier is visible only to this process. With
//! several instances behind a load balancer, a code issued during an outage
//! verifies only on the instance that issued it.

use crate::config::CodeStoreConfig;
use crate::constants::keys;
use crate::providers::{CodeStore, ConsumeOutcome, SharedCodeTier, StoreOutcome};
use crate::stores::LocalCodeTier;
use std::sync::Arc;

/// [`CodeStore`] over a shared tier and an owned local tier.
#[derive(Debug)]
pub struct TieredCodeStore<S> {
    shared: S,
    local: Arc<LocalCodeTier>,
    probe_ttl_secs: u64,
}

impl<S: SharedCodeTier> TieredCodeStore<S> {
    /// Create a store.
    ///
    /// `local` is shared so the caller can also hand it to
    /// [`LocalCodeTier::spawn_sweeper`].
    #[must_use]
    pub fn new(shared: S, local: Arc<LocalCodeTier>, config: &CodeStoreConfig) -> Self {
        Self {
            shared,
            local,
            probe_ttl_secs: config.probe_ttl_secs,
        }
    }

    /// The fallback tier.
    #[must_use]
    pub fn local(&self) -> &Arc<LocalCodeTier> {
        &self.local
    }
}

impl<S: SharedCodeTier> CodeStore for TieredCodeStore<S> {
    async fn is_available(&self) -> bool {
        let key = format!("{}:{}", keys::PROBE_PREFIX, uuid::Uuid::new_v4());
        let value = uuid::Uuid::new_v4().to_string();

        if let Err(e) = self.shared.set(&key, &value, self.probe_ttl_secs).await {
            tracing::debug!(error = %e, "Shared code tier probe write failed");
            return false;
        }

        match self.shared.get(&key).await {
            Ok(Some(read)) => read == value,
            Ok(None) => false,
            Err(e) => {
                tracing::debug!(error = %e, "Shared code tier probe read failed");
                false
            }
        }
    }

    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> StoreOutcome {
        match self.shared.set(key, value, ttl_secs).await {
            Ok(()) => {
                self.local.remove(key);
                StoreOutcome::Stored
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Shared code tier unavailable; storing code locally"
                );
                if self.local.put(key, value, ttl_secs) {
                    StoreOutcome::FellBackToLocal
                } else {
                    tracing::error!("Code could not be stored in either tier");
                    StoreOutcome::Failed
                }
            }
        }
    }

    async fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.local.get(key) {
            return Some(value);
        }
        match self.shared.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(error = %e, "Shared code tier read failed");
                None
            }
        }
    }

    async fn delete(&self, key: &str) {
        if let Err(e) = self.shared.delete(key).await {
            tracing::debug!(error = %e, "Shared code tier delete failed");
        }
        self.local.remove(key);
    }

    async fn consume(&self, key: &str, expected: &str) -> ConsumeOutcome {
        // A live local entry is always newer than the shared one
        match self.local.consume(key, expected) {
            ConsumeOutcome::Consumed => {
                if let Err(e) = self.shared.delete(key).await {
                    tracing::debug!(error = %e, "Failed to drop superseded shared code");
                }
                ConsumeOutcome::Consumed
            }
            ConsumeOutcome::Mismatch => ConsumeOutcome::Mismatch,
            ConsumeOutcome::Absent => match self.shared.compare_and_delete(key, expected).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!(error = %e, "Shared code tier unavailable during consume");
                    ConsumeOutcome::Absent
                }
            },
        }
    }
}
