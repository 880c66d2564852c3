//! Google sign-in endpoint.

use super::{AuthHttpState, require, signed_in};
use crate::providers::{
    AccountRepository, CodeStore, EmailProvider, GoogleIdentityVerifier, TokenIssuer,
};
use axum::{Json, extract::State, response::Response};
use serde::{Deserialize, Serialize};
use wayfarer_web::{ClientIp, CorrelationId, UserAgent, WebResult};

/// Google Identity Services credential.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAuthRequest {
    /// ID token returned to the browser by Google.
    pub id_token: String,
}

/// Sign in (or up) with Google and start a session.
///
/// ```text
/// POST /google
/// {"idToken": "eyJhbGciOi..."}
/// → 200 {"user": {...}, "token": "..."} + Set-Cookie
/// ```
///
/// # Errors
///
/// 401 if Google rejects the token, 503 if Google sign-in is not configured.
pub async fn google_auth<K, E, U, T, G>(
    State(state): State<AuthHttpState<K, E, U, T, G>>,
    correlation_id: CorrelationId,
    client_ip: ClientIp,
    user_agent: UserAgent,
    Json(request): Json<GoogleAuthRequest>,
) -> WebResult<Response>
where
    K: CodeStore + 'static,
    E: EmailProvider + 'static,
    U: AccountRepository + 'static,
    T: TokenIssuer + 'static,
    G: GoogleIdentityVerifier + 'static,
{
    require("idToken", &request.id_token).map_err(|e| state.error(e))?;

    let session = state
        .manager
        .google_auth(&request.id_token)
        .await
        .map_err(|e| state.error(e))?;

    tracing::debug!(
        account_id = %session.account.id,
        correlation_id = %correlation_id.0,
        client_ip = %client_ip.0,
        user_agent = %user_agent.0,
        "Google session started"
    );
    Ok(signed_in(&state.cookie, session))
}
