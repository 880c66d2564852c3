//! One-time code endpoints: registration, sign-in and guest checkout.

use super::{AuthHttpState, require, signed_in};
use crate::otp::Registration;
use crate::providers::{
    AccountRepository, CodeStore, EmailProvider, GoogleIdentityVerifier, TokenIssuer,
};
use crate::state::{Account, CodeIssued, OtpPurpose};
use axum::{Json, extract::State, response::Response};
use serde::{Deserialize, Serialize};
use wayfarer_web::{ClientIp, CorrelationId, UserAgent, WebResult};

/// Request carrying only an email.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CodeRequest {
    /// Address to send the code to.
    pub email: String,
}

/// Sign-in or guest verification.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerifyCodeRequest {
    /// Address the code was sent to.
    pub email: String,
    /// Six-digit code.
    pub code: String,
}

/// Registration verification.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRegistrationRequest {
    /// Address the code was sent to.
    pub email: String,
    /// Six-digit code.
    pub code: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Optional phone number.
    #[serde(default)]
    pub phone: Option<String>,
}

/// Guest account with its token embedded.
#[derive(Debug, Clone, Serialize)]
pub struct GuestUser {
    /// The guest account.
    #[serde(flatten)]
    pub account: Account,
    /// Session token for the checkout.
    pub token: String,
}

/// Guest verification response. No cookie is set.
#[derive(Debug, Clone, Serialize)]
pub struct GuestSessionResponse {
    /// Guest account and token.
    pub user: GuestUser,
}

async fn request_code<K, E, U, T, G>(
    state: &AuthHttpState<K, E, U, T, G>,
    purpose: OtpPurpose,
    client_ip: ClientIp,
    email: &str,
) -> WebResult<Json<CodeIssued>>
where
    K: CodeStore,
    E: EmailProvider,
    U: AccountRepository,
    T: TokenIssuer,
    G: GoogleIdentityVerifier,
{
    tracing::debug!(purpose = %purpose, client_ip = %client_ip.0, "Code requested");
    state
        .manager
        .request_code(purpose, email)
        .await
        .map(Json)
        .map_err(|e| state.error(e))
}

/// Email a registration code.
///
/// ```text
/// POST /register/request-code
/// {"email": "jane@example.com"}
/// → 200 {"expiresAt": "2025-01-01T00:15:00Z"}
/// ```
///
/// # Errors
///
/// 409 if a full account already uses the email.
pub async fn request_registration_code<K, E, U, T, G>(
    State(state): State<AuthHttpState<K, E, U, T, G>>,
    client_ip: ClientIp,
    Json(request): Json<CodeRequest>,
) -> WebResult<Json<CodeIssued>>
where
    K: CodeStore + 'static,
    E: EmailProvider + 'static,
    U: AccountRepository + 'static,
    T: TokenIssuer + 'static,
    G: GoogleIdentityVerifier + 'static,
{
    request_code(&state, OtpPurpose::Register, client_ip, &request.email).await
}

/// Complete registration and start a session.
///
/// ```text
/// POST /register/verify-code
/// {"email": "...", "code": "042137", "firstName": "Jane", "lastName": "Doe"}
/// → 200 {"user": {...}, "token": "..."} + Set-Cookie
/// ```
///
/// # Errors
///
/// 400 for a wrong or expired code, 409 if a full account exists, 422 for
/// blank names.
pub async fn verify_registration_code<K, E, U, T, G>(
    State(state): State<AuthHttpState<K, E, U, T, G>>,
    Json(request): Json<VerifyRegistrationRequest>,
) -> WebResult<Response>
where
    K: CodeStore + 'static,
    E: EmailProvider + 'static,
    U: AccountRepository + 'static,
    T: TokenIssuer + 'static,
    G: GoogleIdentityVerifier + 'static,
{
    require("firstName", &request.first_name).map_err(|e| state.error(e))?;
    require("lastName", &request.last_name).map_err(|e| state.error(e))?;

    let registration = Registration {
        first_name: &request.first_name,
        last_name: &request.last_name,
        phone: request.phone.as_deref().filter(|p| !p.trim().is_empty()),
    };
    let session = state
        .manager
        .verify_registration_code(&request.email, &request.code, registration)
        .await
        .map_err(|e| state.error(e))?;

    Ok(signed_in(&state.cookie, session))
}

/// Email a sign-in code.
///
/// Answers 200 with an expiry whether or not the account exists.
///
/// # Errors
///
/// 422 for a malformed email.
pub async fn request_login_code<K, E, U, T, G>(
    State(state): State<AuthHttpState<K, E, U, T, G>>,
    client_ip: ClientIp,
    Json(request): Json<CodeRequest>,
) -> WebResult<Json<CodeIssued>>
where
    K: CodeStore + 'static,
    E: EmailProvider + 'static,
    U: AccountRepository + 'static,
    T: TokenIssuer + 'static,
    G: GoogleIdentityVerifier + 'static,
{
    request_code(&state, OtpPurpose::Login, client_ip, &request.email).await
}

/// Complete sign-in and start a session.
///
/// # Errors
///
/// 400 for a wrong or expired code, 404 if the account disappeared.
pub async fn verify_login_code<K, E, U, T, G>(
    State(state): State<AuthHttpState<K, E, U, T, G>>,
    correlation_id: CorrelationId,
    client_ip: ClientIp,
    user_agent: UserAgent,
    Json(request): Json<VerifyCodeRequest>,
) -> WebResult<Response>
where
    K: CodeStore + 'static,
    E: EmailProvider + 'static,
    U: AccountRepository + 'static,
    T: TokenIssuer + 'static,
    G: GoogleIdentityVerifier + 'static,
{
    let session = state
        .manager
        .verify_login_code(&request.email, &request.code)
        .await
        .map_err(|e| state.error(e))?;

    tracing::debug!(
        account_id = %session.account.id,
        correlation_id = %correlation_id.0,
        client_ip = %client_ip.0,
        user_agent = %user_agent.0,
        "Login session started"
    );
    Ok(signed_in(&state.cookie, session))
}

/// Email a guest checkout code.
///
/// # Errors
///
/// 409 if a full account already uses the email.
pub async fn request_guest_code<K, E, U, T, G>(
    State(state): State<AuthHttpState<K, E, U, T, G>>,
    client_ip: ClientIp,
    Json(request): Json<CodeRequest>,
) -> WebResult<Json<CodeIssued>>
where
    K: CodeStore + 'static,
    E: EmailProvider + 'static,
    U: AccountRepository + 'static,
    T: TokenIssuer + 'static,
    G: GoogleIdentityVerifier + 'static,
{
    request_code(&state, OtpPurpose::Guest, client_ip, &request.email).await
}

/// Verify a guest email.
///
/// The token travels inside `user`. No cookie is set.
///
/// # Errors
///
/// 400 for a wrong or expired code, 409 if a full account exists.
pub async fn verify_guest_code<K, E, U, T, G>(
    State(state): State<AuthHttpState<K, E, U, T, G>>,
    Json(request): Json<VerifyCodeRequest>,
) -> WebResult<Json<GuestSessionResponse>>
where
    K: CodeStore + 'static,
    E: EmailProvider + 'static,
    U: AccountRepository + 'static,
    T: TokenIssuer + 'static,
    G: GoogleIdentityVerifier + 'static,
{
    let session = state
        .manager
        .verify_guest_code(&request.email, &request.code)
        .await
        .map_err(|e| state.error(e))?;

    Ok(Json(GuestSessionResponse {
        user: GuestUser {
            account: session.account,
            token: session.token,
        },
    }))
}
