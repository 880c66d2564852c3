//! Account repository trait.

use crate::error::Result;
use crate::state::{Account, UserId};

/// Account repository.
///
/// This trait abstracts over account persistence (PostgreSQL in production).
/// Accounts are never deleted through it.
pub trait AccountRepository: Send + Sync {
    /// Look up an account by normalised email.
    ///
    /// # Errors
    ///
    /// Returns error if the database query fails.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<Account>>> + Send;

    /// Look up an account by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the database query fails.
    fn find_by_id(
        &self,
        id: UserId,
    ) -> impl std::future::Future<Output = Result<Option<Account>>> + Send;

    /// Insert a new account.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Database query fails
    /// - Email already exists → `AuthError::AlreadyRegistered`
    fn create(&self, account: &Account)
    -> impl std::future::Future<Output = Result<Account>> + Send;

    /// Overwrite an existing account.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Database query fails
    /// - Account not found → `AuthError::NotFound`
    fn update(&self, account: &Account)
    -> impl std::future::Future<Output = Result<Account>> + Send;
}
