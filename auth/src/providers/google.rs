//! Google identity verification.

use crate::error::{AuthError, Result};
use reqwest::Client;
use serde::Deserialize;

/// Identity asserted by a verified Google ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleIdentity {
    /// Google subject identifier (stable per user).
    pub sub: String,

    /// Email address on the Google account.
    pub email: String,

    /// Whether Google has verified the email.
    pub email_verified: bool,

    /// Display name.
    pub name: Option<String>,

    /// Profile picture URL.
    pub picture: Option<String>,
}

/// Google identity verifier.
///
/// Optional at startup: when no client ID is configured the manager holds
/// `None` and Google sign-in reports `ProviderNotConfigured`.
pub trait GoogleIdentityVerifier: Send + Sync {
    /// Verify an ID token issued to this application.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The token is invalid, expired, or issued for another client →
    ///   `AuthError::GoogleTokenInvalid`
    /// - Network request fails → `AuthError::InternalError`
    fn verify(
        &self,
        id_token: &str,
    ) -> impl std::future::Future<Output = Result<GoogleIdentity>> + Send;
}

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Verifier backed by Google's `tokeninfo` endpoint.
///
/// # Configuration
///
/// Set `GOOGLE_CLIENT_ID` to the OAuth 2.0 client ID from Google Cloud
/// Console. Tokens whose `aud` differs are rejected.
///
/// # Example
///
/// ```no_run
/// use wayfarer_auth::providers::GoogleTokenInfoVerifier;
///
/// let google = GoogleTokenInfoVerifier::new("your-client-id.apps.googleusercontent.com".to_string());
/// ```
#[derive(Clone, Debug)]
pub struct GoogleTokenInfoVerifier {
    /// OAuth 2.0 client ID from Google Cloud Console.
    client_id: String,

    /// HTTP client for making requests.
    http_client: Client,

    /// Endpoint override (tests point this at a local server).
    endpoint: String,
}

impl GoogleTokenInfoVerifier {
    /// Create a verifier for `client_id`.
    #[must_use]
    pub fn new(client_id: String) -> Self {
        Self {
            client_id,
            http_client: Client::new(),
            endpoint: TOKENINFO_URL.to_string(),
        }
    }

    /// Use a different `tokeninfo` endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn check(&self, info: TokenInfo) -> Result<GoogleIdentity> {
        if info.aud != self.client_id {
            tracing::warn!(aud = %info.aud, "Google token issued for another client");
            return Err(AuthError::GoogleTokenInvalid("audience mismatch".to_string()));
        }

        if !ISSUERS.contains(&info.iss.as_str()) {
            tracing::warn!(iss = %info.iss, "Google token has unexpected issuer");
            return Err(AuthError::GoogleTokenInvalid("issuer mismatch".to_string()));
        }

        let Some(email) = info.email else {
            return Err(AuthError::GoogleTokenInvalid("token has no email".to_string()));
        };

        Ok(GoogleIdentity {
            sub: info.sub,
            email,
            email_verified: info.email_verified.is_some_and(|v| v.as_bool()),
            name: info.name,
            picture: info.picture,
        })
    }
}

impl GoogleIdentityVerifier for GoogleTokenInfoVerifier {
    async fn verify(&self, id_token: &str) -> Result<GoogleIdentity> {
        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| AuthError::InternalError(format!("Google tokeninfo request failed: {e}")))?;

        // tokeninfo answers 400 for invalid or expired tokens
        if response.status().is_client_error() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::debug!("Google tokeninfo rejected token: {}", error_body);
            return Err(AuthError::GoogleTokenInvalid("token rejected".to_string()));
        }

        if !response.status().is_success() {
            tracing::error!(status = %response.status(), "Google tokeninfo unavailable");
            return Err(AuthError::InternalError(
                "Google tokeninfo unavailable".to_string(),
            ));
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| AuthError::GoogleTokenInvalid(e.to_string()))?;

        self.check(info)
    }
}

/// `tokeninfo` response body. Booleans arrive as strings.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    iss: String,
    sub: String,
    email: Option<String>,
    email_verified: Option<StringOrBool>,
    name: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrBool {
    Bool(bool),
    String(String),
}

impl StringOrBool {
    fn as_bool(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::String(s) => s == "true",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn info(aud: &str, iss: &str) -> TokenInfo {
        serde_json::from_value(serde_json::json!({
            "aud": aud,
            "iss": iss,
            "sub": "1234567890",
            "email": "jane@gmail.com",
            "email_verified": "true",
            "name": "Jane Doe",
            "picture": "https://lh3.googleusercontent.com/a/jane"
        }))
        .unwrap()
    }

    #[test]
    fn test_accepts_matching_audience() {
        let verifier = GoogleTokenInfoVerifier::new("client-1".into());
        let identity = verifier.check(info("client-1", "https://accounts.google.com")).unwrap();

        assert_eq!(identity.sub, "1234567890");
        assert_eq!(identity.email, "jane@gmail.com");
        assert!(identity.email_verified);
        assert_eq!(identity.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_rejects_other_audience() {
        let verifier = GoogleTokenInfoVerifier::new("client-1".into());
        let result = verifier.check(info("client-2", "accounts.google.com"));
        assert!(matches!(result, Err(AuthError::GoogleTokenInvalid(_))));
    }

    #[test]
    fn test_rejects_foreign_issuer() {
        let verifier = GoogleTokenInfoVerifier::new("client-1".into());
        let result = verifier.check(info("client-1", "https://evil.example.com"));
        assert!(matches!(result, Err(AuthError::GoogleTokenInvalid(_))));
    }

    #[test]
    fn test_email_verified_accepts_bool() {
        let parsed: TokenInfo = serde_json::from_value(serde_json::json!({
            "aud": "a", "iss": "accounts.google.com", "sub": "s",
            "email": "x@y.co", "email_verified": true
        }))
        .unwrap();
        assert!(parsed.email_verified.unwrap().as_bool());
    }
}
