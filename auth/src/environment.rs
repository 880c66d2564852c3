//! Authentication environment.
//!
//! This module defines the environment type for dependency injection
//! into the OTP manager.

use crate::providers::{
    AccountRepository, CodeStore, EmailProvider, GoogleIdentityVerifier, TokenIssuer,
};
use std::sync::Arc;
use wayfarer_core::environment::Clock;

/// Authentication environment.
///
/// Contains all external dependencies needed by [`crate::otp::OtpManager`].
///
/// # Type Parameters
///
/// - `K`: Code store
/// - `E`: Email provider
/// - `U`: Account repository
/// - `T`: Session token issuer
/// - `G`: Google identity verifier (optional at runtime)
pub struct AuthEnvironment<K, E, U, T, G>
where
    K: CodeStore,
    E: EmailProvider,
    U: AccountRepository,
    T: TokenIssuer,
    G: GoogleIdentityVerifier,
{
    /// One-time code store (`Redis` with local fallback).
    pub codes: K,

    /// Email provider.
    pub email: E,

    /// Account repository (`PostgreSQL`).
    pub accounts: U,

    /// Session token issuer.
    pub tokens: T,

    /// Google identity verifier, `None` when no client ID is configured.
    pub google: Option<G>,

    /// Time source.
    pub clock: Arc<dyn Clock>,
}

impl<K, E, U, T, G> AuthEnvironment<K, E, U, T, G>
where
    K: CodeStore,
    E: EmailProvider,
    U: AccountRepository,
    T: TokenIssuer,
    G: GoogleIdentityVerifier,
{
    /// Create a new authentication environment.
    #[must_use]
    pub fn new(
        codes: K,
        email: E,
        accounts: U,
        tokens: T,
        google: Option<G>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            codes,
            email,
            accounts,
            tokens,
            google,
            clock,
        }
    }
}
