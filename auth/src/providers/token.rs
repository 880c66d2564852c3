//! Session token trait.

use crate::error::Result;
use crate::state::UserId;
use serde::{Deserialize, Serialize};

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Account ID.
    pub sub: String,

    /// Issued at (seconds since epoch).
    pub iat: i64,

    /// Expires at (seconds since epoch).
    pub exp: i64,
}

impl TokenClaims {
    /// Parse `sub` back into an account ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if `sub` is not a UUID.
    pub fn user_id(&self) -> Result<UserId> {
        uuid::Uuid::parse_str(&self.sub)
            .map(UserId)
            .map_err(|_| crate::error::AuthError::InvalidToken)
    }
}

/// Session token issuer.
///
/// Tokens are stateless: nothing is stored server-side, and revocation
/// works through `Account::credentials_changed_at`.
pub trait TokenIssuer: Send + Sync {
    /// Issue a signed token for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns error if signing fails.
    fn issue(&self, user_id: UserId) -> Result<String>;

    /// Check signature and expiry and return the claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is malformed, forged,
    /// or expired.
    fn verify(&self, token: &str) -> Result<TokenClaims>;
}
