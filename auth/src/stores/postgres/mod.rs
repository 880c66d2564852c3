//! PostgreSQL storage implementations.
//!
//! This module provides persistent storage using PostgreSQL for user
//! accounts. The schema lives in `auth/migrations` and is embedded at
//! compile time.

pub mod account;

// Re-exports
pub use account::PostgresAccountRepository;
