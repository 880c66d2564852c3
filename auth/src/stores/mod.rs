//! Storage implementations for the auth system.
//!
//! - **Code store** (Redis + in-process fallback) - one-time codes with TTL
//!   and atomic consumption
//! - **Account repository** (PostgreSQL, feature `postgres`) - user accounts

pub mod code_local;
pub mod code_redis;
pub mod code_tiered;
#[cfg(feature = "postgres")]
pub mod postgres;

// Re-exports
pub use code_local::LocalCodeTier;
pub use code_redis::RedisCodeTier;
pub use code_tiered::TieredCodeStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresAccountRepository;
