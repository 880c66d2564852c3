//! Mock provider implementations for testing.
//!
//! This module provides simple, in-memory implementations of all provider traits
//! for use in unit and integration tests.

pub mod account;
pub mod email;
pub mod google;
pub mod shared_tier;

pub use account::MockAccountRepository;
pub use email::{MockEmailProvider, SentEmail};
pub use google::MockGoogleVerifier;
pub use shared_tier::MockSharedTier;
