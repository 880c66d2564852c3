//! # Wayfarer Authentication
//!
//! Passwordless authentication for the Wayfarer booking backend: one-time
//! email codes for registration, sign-in and guest checkout, guest upgrades,
//! and Google sign-in. Sessions are stateless HS256 tokens.
//!
//! ## Features
//!
//! - **Single-use codes**: six digits, hashed at rest, consumed atomically
//! - **Degrades gracefully**: codes fall back to an in-process tier while
//!   Redis is unreachable
//! - **No account enumeration**: sign-in requests for unknown emails look
//!   identical to real ones
//! - **Testable**: every dependency is a trait with an in-memory mock
//!
//! ## Architecture
//!
//! ```text
//! HTTP handler → OtpManager → providers (CodeStore, AccountRepository,
//!                                        EmailProvider, TokenIssuer,
//!                                        GoogleIdentityVerifier)
//! ```
//!
//! ## Example: Guest Checkout
//!
//! ```rust,ignore
//! use wayfarer_auth::*;
//!
//! let issued = manager.request_guest_code("jane@example.com").await?;
//! // ... user reads the code from their inbox ...
//! let session = manager.verify_guest_code("jane@example.com", "042137").await?;
//! assert!(session.account.is_guest);
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod config;
pub mod constants;
pub mod environment;
pub mod error;
pub mod otp;
pub mod providers;
pub mod state;
pub mod stores;
pub mod utils;

#[cfg(feature = "axum")]
pub mod handlers;
#[cfg(feature = "axum")]
pub mod router;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use environment::AuthEnvironment;
pub use error::{AuthError, Result};
pub use otp::{OtpManager, Registration};
pub use state::{Account, AuthSession, CodeIssued, OtpPurpose, UserId};
