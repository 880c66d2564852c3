//! Session endpoints: current account, logout and guest upgrade.

use super::{AuthHttpState, clear_session_cookie, require, signed_in};
use crate::error::AuthError;
use crate::otp::Registration;
use crate::providers::{
    AccountRepository, CodeStore, EmailProvider, GoogleIdentityVerifier, TokenIssuer,
};
use crate::state::Account;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use wayfarer_web::WebResult;

/// The signed-in account.
#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    /// Account behind the session token.
    pub user: Account,
}

/// Logout acknowledgement.
#[derive(Debug, Clone, Serialize)]
pub struct LogoutResponse {
    /// Human-readable confirmation.
    pub message: String,
}

/// Details completing a guest account.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeGuestRequest {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Optional phone number.
    #[serde(default)]
    pub phone: Option<String>,
}

/// Return the account behind the session.
///
/// The token is read from the session cookie or an
/// `Authorization: Bearer` header.
///
/// # Errors
///
/// 401 if the token is missing, invalid, or predates a credential change.
pub async fn me<K, E, U, T, G>(
    State(state): State<AuthHttpState<K, E, U, T, G>>,
    headers: HeaderMap,
) -> WebResult<Json<MeResponse>>
where
    K: CodeStore + 'static,
    E: EmailProvider + 'static,
    U: AccountRepository + 'static,
    T: TokenIssuer + 'static,
    G: GoogleIdentityVerifier + 'static,
{
    let user = state.current_account(&headers).await?;
    Ok(Json(MeResponse { user }))
}

/// Clear the session cookie.
///
/// Tokens are stateless, so a copy held elsewhere stays valid until it
/// expires.
#[allow(clippy::unused_async)]
pub async fn logout<K, E, U, T, G>(
    State(state): State<AuthHttpState<K, E, U, T, G>>,
) -> impl IntoResponse
where
    K: CodeStore + 'static,
    E: EmailProvider + 'static,
    U: AccountRepository + 'static,
    T: TokenIssuer + 'static,
    G: GoogleIdentityVerifier + 'static,
{
    (
        AppendHeaders(clear_session_cookie(&state.cookie).map(|c| (SET_COOKIE, c))),
        Json(LogoutResponse {
            message: "Logged out".to_string(),
        }),
    )
}

/// Turn the current guest session into a full account.
///
/// Only the guest's own session can upgrade it; the email comes from the
/// token, not the body.
///
/// # Errors
///
/// 401 without a valid session, 409 if the account is already full,
/// 422 for blank names.
pub async fn upgrade_guest<K, E, U, T, G>(
    State(state): State<AuthHttpState<K, E, U, T, G>>,
    headers: HeaderMap,
    Json(request): Json<UpgradeGuestRequest>,
) -> WebResult<Response>
where
    K: CodeStore + 'static,
    E: EmailProvider + 'static,
    U: AccountRepository + 'static,
    T: TokenIssuer + 'static,
    G: GoogleIdentityVerifier + 'static,
{
    let account = state.current_account(&headers).await?;
    if !account.is_guest {
        return Err(state.error(AuthError::AlreadyRegistered));
    }

    require("firstName", &request.first_name).map_err(|e| state.error(e))?;
    require("lastName", &request.last_name).map_err(|e| state.error(e))?;

    let registration = Registration {
        first_name: &request.first_name,
        last_name: &request.last_name,
        phone: request.phone.as_deref().filter(|p| !p.trim().is_empty()),
    };
    let session = state
        .manager
        .upgrade_guest(&account.email, registration)
        .await
        .map_err(|e| state.error(e))?;

    Ok(signed_in(&state.cookie, session))
}
