//! HS256 session tokens.

use crate::config::TokenConfig;
use crate::error::{AuthError, Result};
use crate::providers::{TokenClaims, TokenIssuer};
use crate::state::UserId;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use wayfarer_core::environment::Clock;

/// JWT issuer signing with a shared HMAC secret.
///
/// Expiry is checked against the injected clock rather than the system time
/// so tests can move past `exp` deterministically.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use wayfarer_auth::config::TokenConfig;
/// use wayfarer_auth::providers::{JwtTokenIssuer, TokenIssuer};
/// use wayfarer_auth::state::UserId;
/// use wayfarer_core::environment::SystemClock;
///
/// let issuer = JwtTokenIssuer::new(&TokenConfig::new("secret".into()), Arc::new(SystemClock));
/// let user = UserId::new();
/// let token = issuer.issue(user).unwrap();
/// assert_eq!(issuer.verify(&token).unwrap().user_id().unwrap(), user);
/// ```
#[derive(Clone)]
pub struct JwtTokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl JwtTokenIssuer {
    /// Create an issuer from configuration.
    #[must_use]
    pub fn new(config: &TokenConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl: config.ttl,
            clock,
        }
    }
}

impl std::fmt::Debug for JwtTokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, user_id: UserId) -> Result<String> {
        let now = self.clock.now();
        let claims = TokenClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::InternalError(format!("Failed to sign token: {e}")))
    }

    fn verify(&self, token: &str) -> Result<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "iat", "exp"]);

        let claims = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected session token");
                AuthError::InvalidToken
            })?
            .claims;

        if claims.exp <= self.clock.now().timestamp() {
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use wayfarer_testing::{ManualClock, test_clock};

    fn issuer(clock: &ManualClock, secret: &str) -> JwtTokenIssuer {
        JwtTokenIssuer::new(
            &TokenConfig::new(secret.to_string()).with_ttl(Duration::days(90)),
            Arc::new(clock.clone()),
        )
    }

    #[test]
    fn test_round_trip_claims() {
        let clock = ManualClock::new(test_clock().now());
        let issuer = issuer(&clock, "secret");
        let user = UserId::new();

        let claims = issuer.verify(&issuer.issue(user).unwrap()).unwrap();

        assert_eq!(claims.user_id().unwrap(), user);
        assert_eq!(claims.iat, test_clock().now().timestamp());
        assert_eq!(claims.exp - claims.iat, Duration::days(90).num_seconds());
    }

    #[test]
    fn test_expired_token_rejected() {
        let clock = ManualClock::new(test_clock().now());
        let issuer = issuer(&clock, "secret");
        let token = issuer.issue(UserId::new()).unwrap();

        clock.advance(Duration::days(90));

        assert_eq!(issuer.verify(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let clock = ManualClock::new(test_clock().now());
        let token = issuer(&clock, "secret-a").issue(UserId::new()).unwrap();

        assert_eq!(
            issuer(&clock, "secret-b").verify(&token),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn test_garbage_rejected() {
        let clock = ManualClock::new(test_clock().now());
        assert_eq!(
            issuer(&clock, "secret").verify("not.a.jwt"),
            Err(AuthError::InvalidToken)
        );
    }
}
