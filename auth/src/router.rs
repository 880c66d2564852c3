//! Authentication router composition.
//!
//! Composes all authentication handlers into a single Axum router.

use crate::handlers::{AuthHttpState, google, otp, session};
use crate::providers::{
    AccountRepository, CodeStore, EmailProvider, GoogleIdentityVerifier, TokenIssuer,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Create the authentication router.
///
/// # Routes
///
/// ## Registration
/// - `POST /register/request-code` - Email a registration code
/// - `POST /register/verify-code` - Create the account, set the session cookie
///
/// ## Sign-in
/// - `POST /login/request-code` - Email a sign-in code
/// - `POST /login/verify-code` - Start a session
/// - `POST /google` - Sign in with a Google ID token
///
/// ## Guest checkout
/// - `POST /guest/request-code` - Email a guest code
/// - `POST /guest/verify-code` - Verify the email, token returned in the body
/// - `POST /guest/upgrade` - Turn the current guest into a full account
///
/// ## Session
/// - `GET /me` - Current account
/// - `POST /logout` - Clear the session cookie
///
/// # Example
///
/// ```rust,ignore
/// let state = AuthHttpState::new(Arc::new(manager), SessionCookieConfig::default());
///
/// let app = Router::new()
///     .nest("/api/v1/auth", auth_router(state))
///     .layer(TraceLayer::new_for_http());
/// ```
pub fn auth_router<K, E, U, T, G>(state: AuthHttpState<K, E, U, T, G>) -> Router
where
    K: CodeStore + 'static,
    E: EmailProvider + 'static,
    U: AccountRepository + 'static,
    T: TokenIssuer + 'static,
    G: GoogleIdentityVerifier + 'static,
{
    Router::new()
        // Registration
        .route("/register/request-code", post(otp::request_registration_code::<K, E, U, T, G>))
        .route("/register/verify-code", post(otp::verify_registration_code::<K, E, U, T, G>))

        // Sign-in
        .route("/login/request-code", post(otp::request_login_code::<K, E, U, T, G>))
        .route("/login/verify-code", post(otp::verify_login_code::<K, E, U, T, G>))
        .route("/google", post(google::google_auth::<K, E, U, T, G>))

        // Guest checkout
        .route("/guest/request-code", post(otp::request_guest_code::<K, E, U, T, G>))
        .route("/guest/verify-code", post(otp::verify_guest_code::<K, E, U, T, G>))
        .route("/guest/upgrade", post(session::upgrade_guest::<K, E, U, T, G>))

        // Session
        .route("/me", get(session::me::<K, E, U, T, G>))
        .route("/logout", post(session::logout::<K, E, U, T, G>))

        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{CodeStoreConfig, OtpConfig, SessionCookieConfig, TokenConfig};
    use crate::environment::AuthEnvironment;
    use crate::mocks::{
        MockAccountRepository, MockEmailProvider, MockGoogleVerifier, MockSharedTier,
    };
    use crate::otp::OtpManager;
    use crate::providers::{GoogleIdentity, JwtTokenIssuer};
    use crate::state::OtpPurpose;
    use crate::stores::{LocalCodeTier, TieredCodeStore};
    use axum::body::Body;
    use axum::http::{Request, Response, StatusCode, header};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;
    use wayfarer_core::environment::Clock;
    use wayfarer_testing::{ManualClock, test_clock};

    type TestState = AuthHttpState<
        TieredCodeStore<MockSharedTier>,
        MockEmailProvider,
        MockAccountRepository,
        JwtTokenIssuer,
        MockGoogleVerifier,
    >;

    struct Harness {
        app: Router,
        email: MockEmailProvider,
    }

    fn harness(google: Option<MockGoogleVerifier>) -> Harness {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(test_clock().now()));
        let config = CodeStoreConfig::default();
        let codes = TieredCodeStore::new(
            MockSharedTier::new(Arc::clone(&clock)),
            Arc::new(LocalCodeTier::new(Arc::clone(&clock), config.local_max_entries)),
            &config,
        );
        let email = MockEmailProvider::new();
        let tokens = JwtTokenIssuer::new(
            &TokenConfig::new("router-test-secret-router-test-secret".to_string()),
            Arc::clone(&clock),
        );
        let env = AuthEnvironment::new(
            codes,
            email.clone(),
            MockAccountRepository::new(),
            tokens,
            google,
            clock,
        );
        let manager = OtpManager::new(env, OtpConfig::default());
        let state: TestState = AuthHttpState::new(
            Arc::new(manager),
            SessionCookieConfig::default().with_secure(false),
        );

        Harness {
            app: auth_router(state),
            email,
        }
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response<Body>) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn set_cookie(response: &Response<Body>) -> Option<String> {
        response
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string())
    }

    async fn register(h: &Harness, email: &str) -> Response<Body> {
        send(&h.app, post_json("/register/request-code", &json!({ "email": email }))).await;
        let code = h.email.last_code(email, OtpPurpose::Register).unwrap();
        send(
            &h.app,
            post_json(
                "/register/verify-code",
                &json!({
                    "email": email,
                    "code": code,
                    "firstName": "Jane",
                    "lastName": "Doe",
                }),
            ),
        )
        .await
    }

    #[tokio::test]
    async fn test_request_code_returns_expiry() {
        let h = harness(None);

        let response = send(
            &h.app,
            post_json("/register/request-code", &json!({ "email": "jane@example.com" })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["expiresAt"], "2025-01-01T00:15:00Z");
    }

    #[tokio::test]
    async fn test_register_sets_session_cookie() {
        let h = harness(None);

        let response = register(&h, "jane@example.com").await;

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = set_cookie(&response).unwrap();
        assert!(cookie.starts_with("jwt="));
        assert!(cookie.contains("HttpOnly"));

        let body = json_body(response).await;
        assert_eq!(body["user"]["name"], "Jane Doe");
        assert_eq!(body["user"]["isGuest"], false);
        assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_conflict() {
        let h = harness(None);
        register(&h, "jane@example.com").await;

        let response = send(
            &h.app,
            post_json("/register/request-code", &json!({ "email": "jane@example.com" })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = json_body(response).await;
        assert_eq!(body["code"], "ALREADY_REGISTERED");
    }

    #[tokio::test]
    async fn test_unknown_login_code_is_bad_request() {
        let h = harness(None);
        send(&h.app, post_json("/login/request-code", &json!({ "email": "x@example.com" }))).await;

        let response = send(
            &h.app,
            post_json("/login/verify-code", &json!({ "email": "x@example.com", "code": "123456" })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["code"], "OTP_EXPIRED_OR_INVALID");
    }

    #[tokio::test]
    async fn test_malformed_email_is_unprocessable() {
        let h = harness(None);

        let response = send(
            &h.app,
            post_json("/guest/request-code", &json!({ "email": "not-an-email" })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_blank_name_is_unprocessable() {
        let h = harness(None);
        send(&h.app, post_json("/register/request-code", &json!({ "email": "a@example.com" }))).await;
        let code = h.email.last_code("a@example.com", OtpPurpose::Register).unwrap();

        let response = send(
            &h.app,
            post_json(
                "/register/verify-code",
                &json!({ "email": "a@example.com", "code": code, "firstName": " ", "lastName": "Doe" }),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        // Rejected before the code was consumed
        let response = send(
            &h.app,
            post_json(
                "/register/verify-code",
                &json!({ "email": "a@example.com", "code": code, "firstName": "Ann", "lastName": "Doe" }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_guest_verify_embeds_token_without_cookie() {
        let h = harness(None);
        send(&h.app, post_json("/guest/request-code", &json!({ "email": "g@example.com" }))).await;
        let code = h.email.last_code("g@example.com", OtpPurpose::Guest).unwrap();

        let response = send(
            &h.app,
            post_json("/guest/verify-code", &json!({ "email": "g@example.com", "code": code })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(set_cookie(&response).is_none());
        let body = json_body(response).await;
        assert_eq!(body["user"]["isGuest"], true);
        assert!(body["user"]["token"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_me_accepts_cookie_and_bearer() {
        let h = harness(None);
        let response = register(&h, "jane@example.com").await;
        let token = json_body(response).await["token"].as_str().unwrap().to_string();

        let by_cookie = Request::builder()
            .uri("/me")
            .header(header::COOKIE, format!("jwt={token}"))
            .body(Body::empty())
            .unwrap();
        let response = send(&h.app, by_cookie).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["user"]["email"], "jane@example.com");

        let by_bearer = Request::builder()
            .uri("/me")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let response = send(&h.app, by_bearer).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_me_without_session_is_unauthorized() {
        let h = harness(None);

        let response = send(&h.app, Request::builder().uri("/me").body(Body::empty()).unwrap()).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let h = harness(None);

        let response = send(
            &h.app,
            Request::builder()
                .method("POST")
                .uri("/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(set_cookie(&response).unwrap().contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_guest_upgrade_uses_session_email() {
        let h = harness(None);
        send(&h.app, post_json("/guest/request-code", &json!({ "email": "g@example.com" }))).await;
        let code = h.email.last_code("g@example.com", OtpPurpose::Guest).unwrap();
        let response = send(
            &h.app,
            post_json("/guest/verify-code", &json!({ "email": "g@example.com", "code": code })),
        )
        .await;
        let guest = json_body(response).await;
        let token = guest["user"]["token"].as_str().unwrap();

        let mut upgrade = post_json(
            "/guest/upgrade",
            &json!({ "firstName": "Gail", "lastName": "Guest" }),
        );
        upgrade.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        let response = send(&h.app, upgrade).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(set_cookie(&response).is_some());
        let body = json_body(response).await;
        assert_eq!(body["user"]["id"], guest["user"]["id"]);
        assert_eq!(body["user"]["isGuest"], false);
        assert_eq!(body["user"]["name"], "Gail Guest");
    }

    #[tokio::test]
    async fn test_google_not_configured_is_unavailable() {
        let h = harness(None);

        let response = send(&h.app, post_json("/google", &json!({ "idToken": "abc" }))).await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_body(response).await;
        assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_google_sign_in_sets_cookie() {
        let google = MockGoogleVerifier::new().with_token(
            "good-token",
            GoogleIdentity {
                sub: "google-123".to_string(),
                email: "jane@example.com".to_string(),
                email_verified: true,
                name: Some("Jane Doe".to_string()),
                picture: None,
            },
        );
        let h = harness(Some(google));

        let response = send(&h.app, post_json("/google", &json!({ "idToken": "good-token" }))).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(set_cookie(&response).is_some());
        let body = json_body(response).await;
        assert_eq!(body["user"]["authProvider"], "GOOGLE");
        assert_eq!(body["user"]["googleId"], "google-123");

        let response = send(&h.app, post_json("/google", &json!({ "idToken": "forged" }))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
