//! HTTP handlers for the authentication endpoints.
//!
//! Handlers are thin: they validate the request shape, call
//! [`OtpManager`](crate::otp::OtpManager), and map the result to JSON plus
//! the session cookie. [`AuthError`] becomes an [`AppError`] according to
//! the table in [`app_error`].

pub mod google;
pub mod otp;
pub mod session;

use crate::config::SessionCookieConfig;
use crate::error::AuthError;
use crate::otp::OtpManager;
use crate::providers::{
    AccountRepository, CodeStore, EmailProvider, GoogleIdentityVerifier, TokenIssuer,
};
use crate::state::{Account, AuthSession};
use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;
use wayfarer_web::{AppError, WebResult, bearer_token, cookie_value};

/// Shared state for the authentication router.
pub struct AuthHttpState<K, E, U, T, G>
where
    K: CodeStore,
    E: EmailProvider,
    U: AccountRepository,
    T: TokenIssuer,
    G: GoogleIdentityVerifier,
{
    /// Code flows and account operations.
    pub manager: Arc<OtpManager<K, E, U, T, G>>,

    /// Session cookie attributes.
    pub cookie: SessionCookieConfig,
}

impl<K, E, U, T, G> AuthHttpState<K, E, U, T, G>
where
    K: CodeStore,
    E: EmailProvider,
    U: AccountRepository,
    T: TokenIssuer,
    G: GoogleIdentityVerifier,
{
    /// Bundle the manager with cookie settings.
    #[must_use]
    pub const fn new(manager: Arc<OtpManager<K, E, U, T, G>>, cookie: SessionCookieConfig) -> Self {
        Self { manager, cookie }
    }

    /// Map an error using the manager's exposure setting.
    #[must_use]
    pub fn error(&self, err: AuthError) -> AppError {
        app_error(err, self.manager.config().expose_internal_errors)
    }

    /// Session token from the cookie, falling back to `Authorization: Bearer`.
    #[must_use]
    pub fn session_token<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        cookie_value(headers, &self.cookie.name).or_else(|| bearer_token(headers))
    }

    /// Resolve the request's session to its account.
    ///
    /// # Errors
    ///
    /// Returns a 401 if no token was sent or it does not verify.
    pub async fn current_account(&self, headers: &HeaderMap) -> WebResult<Account> {
        let Some(token) = self.session_token(headers) else {
            return Err(AppError::unauthorized("Not authenticated"));
        };
        self.manager
            .authenticate(token)
            .await
            .map_err(|e| self.error(e))
    }
}

impl<K, E, U, T, G> Clone for AuthHttpState<K, E, U, T, G>
where
    K: CodeStore,
    E: EmailProvider,
    U: AccountRepository,
    T: TokenIssuer,
    G: GoogleIdentityVerifier,
{
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
            cookie: self.cookie.clone(),
        }
    }
}

/// Account plus session token.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    /// The signed-in account.
    pub user: Account,

    /// Session token, also set as a cookie.
    pub token: String,
}

/// Map an [`AuthError`] to an HTTP error.
///
/// | Error | Status |
/// |---|---|
/// | `AlreadyRegistered` | 409 |
/// | `OtpInvalid`, `OtpExpiredOrInvalid` | 400 |
/// | `UserNotFound`, `NotFound` | 404 |
/// | `InvalidEmail`, `InvalidInput` | 422 |
/// | `InvalidToken`, `CredentialsChanged`, `GoogleTokenInvalid` | 401 |
/// | `ProviderNotConfigured` | 503 |
/// | infrastructure | 500 |
///
/// Unless `expose_internal` is set, 5xx messages are replaced with a generic
/// one. The original error is kept as the source and logged.
#[must_use]
pub fn app_error(err: AuthError, expose_internal: bool) -> AppError {
    let status = match &err {
        AuthError::AlreadyRegistered => StatusCode::CONFLICT,
        AuthError::OtpInvalid | AuthError::OtpExpiredOrInvalid => StatusCode::BAD_REQUEST,
        AuthError::UserNotFound | AuthError::NotFound => StatusCode::NOT_FOUND,
        AuthError::InvalidEmail | AuthError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AuthError::InvalidToken
        | AuthError::CredentialsChanged
        | AuthError::GoogleTokenInvalid(_) => StatusCode::UNAUTHORIZED,
        AuthError::ProviderNotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
        AuthError::DatabaseError(_)
        | AuthError::CacheError(_)
        | AuthError::EmailError(_)
        | AuthError::SerializationError(_)
        | AuthError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let error = AppError::new(status, err.to_string(), err.code().to_string());
    if status.is_server_error() {
        let error = error.with_source(anyhow::Error::new(err));
        if expose_internal { error } else { error.redacted() }
    } else {
        error
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        app_error(err, false)
    }
}

/// `Set-Cookie` value carrying a session token.
#[must_use]
pub fn session_cookie(config: &SessionCookieConfig, token: &str) -> Option<HeaderValue> {
    cookie_header(config, token, config.max_age_secs())
}

/// `Set-Cookie` value that removes the session cookie.
#[must_use]
pub fn clear_session_cookie(config: &SessionCookieConfig) -> Option<HeaderValue> {
    cookie_header(config, "", 0)
}

fn cookie_header(config: &SessionCookieConfig, value: &str, max_age: i64) -> Option<HeaderValue> {
    let mut cookie = format!(
        "{}={value}; HttpOnly; SameSite=Strict; Path=/; Max-Age={max_age}",
        config.name
    );
    if config.secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).ok()
}

/// JSON session body plus the cookie that carries the same token.
pub(crate) fn signed_in(config: &SessionCookieConfig, session: AuthSession) -> Response {
    (
        AppendHeaders(session_cookie(config, &session.token).map(|c| (SET_COOKIE, c))),
        Json(SessionResponse {
            user: session.account,
            token: session.token,
        }),
    )
        .into_response()
}

/// Reject blank required fields at the boundary.
pub(crate) fn require(field: &str, value: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        Err(AuthError::InvalidInput(format!("{field} is required")))
    } else {
        Ok(())
    }
}
