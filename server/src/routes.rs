//! Router for the authentication server.

use crate::email::AppEmailProvider;
use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use wayfarer_auth::handlers::AuthHttpState;
use wayfarer_auth::otp::OtpManager;
use wayfarer_auth::providers::{CodeStore, GoogleTokenInfoVerifier, JwtTokenIssuer};
use wayfarer_auth::router::auth_router;
use wayfarer_auth::stores::{PostgresAccountRepository, RedisCodeTier, TieredCodeStore};
use wayfarer_web::correlation_id_layer;
use wayfarer_web::handlers::{ReadinessResponse, health_check};

/// The production wiring of [`OtpManager`].
pub type AuthManager = OtpManager<
    TieredCodeStore<RedisCodeTier>,
    AppEmailProvider,
    PostgresAccountRepository,
    JwtTokenIssuer,
    GoogleTokenInfoVerifier,
>;

/// HTTP state for the production router.
pub type AuthState = AuthHttpState<
    TieredCodeStore<RedisCodeTier>,
    AppEmailProvider,
    PostgresAccountRepository,
    JwtTokenIssuer,
    GoogleTokenInfoVerifier,
>;

/// Build the complete router.
///
/// - `GET /health` - liveness
/// - `GET /ready` - database and cache probes
/// - `/api/v1/auth/*` - authentication endpoints
pub fn build_router(state: AuthState) -> Router {
    let readiness_routes = Router::new()
        .route("/ready", get(readiness_check))
        .with_state(Arc::clone(&state.manager));

    Router::new()
        .route("/health", get(health_check))
        .merge(readiness_routes)
        .nest("/api/v1/auth", auth_router(state))
        .layer(correlation_id_layer())
        .layer(TraceLayer::new_for_http())
}

/// Readiness check.
///
/// The cache is reported but does not gate readiness; codes fall back to
/// process memory while it is down.
async fn readiness_check(
    State(manager): State<Arc<AuthManager>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let env = manager.environment();
    let (cache, database) = tokio::join!(env.codes.is_available(), env.accounts.ping());

    if let Err(e) = &database {
        tracing::warn!(error = %e, "Readiness: database unreachable");
    }
    if !cache {
        tracing::warn!("Readiness: shared code cache unreachable, using local fallback");
    }

    let readiness = ReadinessResponse::new(database.is_ok(), cache);
    (readiness.status(), Json(readiness))
}
