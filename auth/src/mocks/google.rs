//! Mock Google identity verifier for testing.

use crate::error::{AuthError, Result};
use crate::providers::{GoogleIdentity, GoogleIdentityVerifier};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Mock Google verifier.
///
/// Accepts only ID tokens registered with [`MockGoogleVerifier::with_token`].
#[derive(Debug, Clone, Default)]
pub struct MockGoogleVerifier {
    tokens: Arc<Mutex<HashMap<String, GoogleIdentity>>>,
}

impl MockGoogleVerifier {
    /// Create a verifier that rejects everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `id_token` as asserting `identity`.
    #[must_use]
    pub fn with_token(self, id_token: &str, identity: GoogleIdentity) -> Self {
        if let Ok(mut tokens) = self.tokens.lock() {
            tokens.insert(id_token.to_string(), identity);
        }
        self
    }
}

impl GoogleIdentityVerifier for MockGoogleVerifier {
    fn verify(&self, id_token: &str) -> impl Future<Output = Result<GoogleIdentity>> + Send {
        let result = self
            .tokens
            .lock()
            .map_err(|_| AuthError::InternalError("lock poisoned".to_string()))
            .and_then(|tokens| {
                tokens
                    .get(id_token)
                    .cloned()
                    .ok_or_else(|| AuthError::GoogleTokenInvalid("unknown token".to_string()))
            });
        async move { result }
    }
}
