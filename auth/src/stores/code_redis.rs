//! Redis shared tier for one-time codes.
//!
//! # Architecture
//!
//! Codes are stored in Redis with:
//! - **Key**: `otp:{purpose}:{email}` → hex SHA-256 of the code
//! - **TTL**: 900 seconds, set atomically with the value (SETEX)
//! - **Atomic consumption**: a Lua script compares and deletes in one step
//!
//! # Availability
//!
//! The connection is opened lazily on first use, so a server can boot while
//! Redis is down. Every command, including the connect, is bounded by the
//! configured timeout; a stalled cache surfaces as `AuthError::CacheError`
//! and the tiered store degrades to its local tier.
//!
//! # Example
//!
//! ```no_run
//! use wayfarer_auth::stores::RedisCodeTier;
//! use wayfarer_auth::providers::SharedCodeTier;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let tier = RedisCodeTier::new("redis://127.0.0.1:6379", Duration::from_secs(2))?;
//! tier.set("otp:login:jane@example.com", "9f86d0…", 900).await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::providers::{ConsumeOutcome, SharedCodeTier};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Script};
use std::time::Duration;
use tokio::sync::OnceCell;

/// GET + compare + DEL as one atomic step.
///
/// Returns 1 when consumed, -1 on mismatch, 0 when the key is absent.
const COMPARE_AND_DELETE: &str = r"
local current = redis.call('GET', KEYS[1])
if not current then
    return 0
end
if current == ARGV[1] then
    redis.call('DEL', KEYS[1])
    return 1
end
return -1
";

/// `Redis`-backed shared code tier.
///
/// # Thread Safety
///
/// This type is `Clone`; clones share the lazily created `ConnectionManager`.
#[derive(Clone)]
pub struct RedisCodeTier {
    client: Client,
    conn: std::sync::Arc<OnceCell<ConnectionManager>>,
    op_timeout: Duration,
    compare_and_delete: Script,
}

impl RedisCodeTier {
    /// Create a shared tier for `redis_url`. No connection is made yet.
    ///
    /// # Connection URL Format
    ///
    /// - TCP: `redis://[:password@]host[:port][/database]`
    /// - TLS: `rediss://[:password@]host[:port][/database]`
    ///
    /// # Errors
    ///
    /// Returns error if the URL is malformed.
    pub fn new(redis_url: &str, op_timeout: Duration) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| AuthError::CacheError(format!("Failed to create Redis client: {e}")))?;

        Ok(Self {
            client,
            conn: std::sync::Arc::new(OnceCell::new()),
            op_timeout,
            compare_and_delete: Script::new(COMPARE_AND_DELETE),
        })
    }

    /// Shared connection, created on first use.
    async fn connection(&self) -> Result<ConnectionManager> {
        let client = self.client.clone();
        let init = self
            .conn
            .get_or_try_init(|| async move { ConnectionManager::new(client).await });

        let conn = tokio::time::timeout(self.op_timeout, init)
            .await
            .map_err(|_| AuthError::CacheError("Redis connect timed out".to_string()))?
            .map_err(|e| AuthError::CacheError(format!("Redis connect failed: {e}")))?;

        Ok(conn.clone())
    }

    /// Run one command under the operation timeout.
    async fn bounded<T>(
        &self,
        op: &'static str,
        fut: impl std::future::Future<Output = redis::RedisResult<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(AuthError::CacheError(format!("Redis {op} failed: {e}"))),
            Err(_) => Err(AuthError::CacheError(format!("Redis {op} timed out"))),
        }
    }
}

impl std::fmt::Debug for RedisCodeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCodeTier")
            .field("connected", &self.conn.initialized())
            .field("op_timeout", &self.op_timeout)
            .finish_non_exhaustive()
    }
}

impl SharedCodeTier for RedisCodeTier {
    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let mut conn = self.connection().await?;

        // SETEX is atomic: SET + EXPIRE in one command
        let _: () = self
            .bounded("SETEX", conn.set_ex(key, value, ttl_secs))
            .await?;

        tracing::debug!(key = key, ttl_seconds = ttl_secs, "Stored code in Redis");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = self.bounded("GET", conn.get(key)).await?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        let deleted: i64 = self.bounded("DEL", conn.del(key)).await?;

        if deleted > 0 {
            tracing::debug!(key = key, "Deleted code from Redis");
        } else {
            tracing::trace!(key = key, "Code delete: key not found");
        }
        Ok(())
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<ConsumeOutcome> {
        let mut conn = self.connection().await?;
        let result: i64 = self
            .bounded(
                "EVALSHA",
                self.compare_and_delete
                    .key(key)
                    .arg(expected)
                    .invoke_async(&mut conn),
            )
            .await?;

        Ok(match result {
            1 => ConsumeOutcome::Consumed,
            -1 => ConsumeOutcome::Mismatch,
            _ => ConsumeOutcome::Absent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_malformed_url() {
        let result = RedisCodeTier::new("not a url", Duration::from_secs(1));
        assert!(matches!(result, Err(AuthError::CacheError(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_cache_error() {
        // Port 1 is never a Redis server
        let Ok(tier) = RedisCodeTier::new("redis://127.0.0.1:1", Duration::from_millis(200))
        else {
            return;
        };

        let result = tier.get("otp:login:jane@example.com").await;

        assert!(matches!(result, Err(AuthError::CacheError(_))));
    }

    #[tokio::test]
    #[ignore] // Requires Redis running at localhost:6379
    #[allow(clippy::unwrap_used)] // Test code
    async fn test_redis_compare_and_delete() {
        let tier = RedisCodeTier::new("redis://127.0.0.1:6379", Duration::from_secs(2)).unwrap();
        let key = format!("otp:test:{}", uuid::Uuid::new_v4());

        tier.set(&key, "hash-a", 60).await.unwrap();

        assert_eq!(
            tier.compare_and_delete(&key, "hash-b").await.unwrap(),
            ConsumeOutcome::Mismatch
        );
        assert_eq!(tier.get(&key).await.unwrap().as_deref(), Some("hash-a"));

        assert_eq!(
            tier.compare_and_delete(&key, "hash-a").await.unwrap(),
            ConsumeOutcome::Consumed
        );
        assert_eq!(
            tier.compare_and_delete(&key, "hash-a").await.unwrap(),
            ConsumeOutcome::Absent
        );
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    #[allow(clippy::unwrap_used)] // Test code
    async fn test_redis_concurrent_consume_single_winner() {
        let tier = RedisCodeTier::new("redis://127.0.0.1:6379", Duration::from_secs(2)).unwrap();
        let key = format!("otp:test:{}", uuid::Uuid::new_v4());
        tier.set(&key, "hash", 60).await.unwrap();

        let (a, b) = tokio::join!(
            tier.compare_and_delete(&key, "hash"),
            tier.compare_and_delete(&key, "hash")
        );

        let consumed = [a.unwrap(), b.unwrap()]
            .into_iter()
            .filter(|o| *o == ConsumeOutcome::Consumed)
            .count();
        assert_eq!(consumed, 1);
    }
}
