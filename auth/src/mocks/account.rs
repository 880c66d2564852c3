//! Mock account repository for testing.

use crate::error::{AuthError, Result};
use crate::providers::AccountRepository;
use crate::state::{Account, UserId};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Mock account repository.
///
/// Uses in-memory storage and enforces email uniqueness like the real table.
#[derive(Debug, Clone, Default)]
pub struct MockAccountRepository {
    accounts: Arc<Mutex<HashMap<UserId, Account>>>,
}

impl MockAccountRepository {
    /// Create a new mock account repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account directly, bypassing uniqueness checks.
    pub fn insert(&self, account: Account) {
        if let Ok(mut accounts) = self.accounts.lock() {
            accounts.insert(account.id, account);
        }
    }

    /// Number of stored accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.lock().map_or(0, |accounts| accounts.len())
    }

    /// `true` if no accounts are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot lookup by email, for assertions.
    #[must_use]
    pub fn get_by_email(&self, email: &str) -> Option<Account> {
        self.accounts
            .lock()
            .ok()?
            .values()
            .find(|account| account.email == email)
            .cloned()
    }
}

impl AccountRepository for MockAccountRepository {
    fn find_by_email(&self, email: &str) -> impl Future<Output = Result<Option<Account>>> + Send {
        let accounts = Arc::clone(&self.accounts);
        let email = email.to_string();

        async move {
            Ok(accounts
                .lock()
                .map_err(|_| AuthError::InternalError("lock poisoned".to_string()))?
                .values()
                .find(|account| account.email == email)
                .cloned())
        }
    }

    fn find_by_id(&self, id: UserId) -> impl Future<Output = Result<Option<Account>>> + Send {
        let accounts = Arc::clone(&self.accounts);

        async move {
            Ok(accounts
                .lock()
                .map_err(|_| AuthError::InternalError("lock poisoned".to_string()))?
                .get(&id)
                .cloned())
        }
    }

    fn create(&self, account: &Account) -> impl Future<Output = Result<Account>> + Send {
        let accounts = Arc::clone(&self.accounts);
        let account = account.clone();

        async move {
            let mut guard = accounts
                .lock()
                .map_err(|_| AuthError::InternalError("lock poisoned".to_string()))?;

            if guard.values().any(|existing| existing.email == account.email) {
                return Err(AuthError::AlreadyRegistered);
            }

            guard.insert(account.id, account.clone());
            Ok(account)
        }
    }

    fn update(&self, account: &Account) -> impl Future<Output = Result<Account>> + Send {
        let accounts = Arc::clone(&self.accounts);
        let account = account.clone();

        async move {
            let mut guard = accounts
                .lock()
                .map_err(|_| AuthError::InternalError("lock poisoned".to_string()))?;

            if !guard.contains_key(&account.id) {
                return Err(AuthError::NotFound);
            }

            guard.insert(account.id, account.clone());
            Ok(account)
        }
    }
}
