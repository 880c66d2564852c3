//! Wayfarer authentication server.
//!
//! Serves one-time code, guest and Google sign-in endpoints under
//! `/api/v1/auth`, backed by PostgreSQL accounts and a Redis code cache with
//! an in-process fallback.

mod config;
mod email;
mod routes;

use anyhow::Context;
use chrono::Duration;
use config::Config;
use email::AppEmailProvider;
use routes::build_router;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wayfarer_auth::config::{CodeStoreConfig, OtpConfig, SessionCookieConfig, TokenConfig};
use wayfarer_auth::handlers::AuthHttpState;
use wayfarer_auth::providers::{CodeStore, GoogleTokenInfoVerifier, JwtTokenIssuer};
use wayfarer_auth::stores::{
    LocalCodeTier, PostgresAccountRepository, RedisCodeTier, TieredCodeStore,
};
use wayfarer_auth::{AuthEnvironment, OtpManager};
use wayfarer_core::environment::{Clock, SystemClock};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wayfarer_server=info,wayfarer_auth=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }

    let config = Config::from_env().context("invalid configuration")?;
    info!(
        environment = ?config.server.environment,
        redis_host = %config.redis.host(),
        google = config.auth.google_client_id.is_some(),
        "Configuration loaded"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Accounts
    info!("Connecting to account database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .context("failed to connect to PostgreSQL")?;
    let accounts = PostgresAccountRepository::new(pool);
    accounts.migrate().await?;
    info!("Account database ready");

    // One-time codes
    let store_config =
        CodeStoreConfig::default().with_shared_op_timeout(config.redis.op_timeout);
    let shared = RedisCodeTier::new(&config.redis.url, store_config.shared_op_timeout)?;
    let local = Arc::new(LocalCodeTier::new(
        Arc::clone(&clock),
        store_config.local_max_entries,
    ));
    let sweeper = Arc::clone(&local).spawn_sweeper(store_config.sweep_interval);
    let codes = TieredCodeStore::new(shared, local, &store_config);
    if codes.is_available().await {
        info!("Shared code cache reachable");
    } else {
        warn!("Shared code cache unreachable, codes will use the local fallback tier");
    }

    // Collaborators
    let email = AppEmailProvider::from_config(&config.email)?;
    info!(provider = email.kind(), "Email provider configured");

    let tokens = JwtTokenIssuer::new(
        &TokenConfig::new(config.auth.jwt_secret.clone())
            .with_ttl(
                Duration::try_days(config.auth.jwt_expires_in_days)
                    .context("JWT_EXPIRES_IN_DAYS out of range")?,
            ),
        Arc::clone(&clock),
    );

    let google = config
        .auth
        .google_client_id
        .clone()
        .map(GoogleTokenInfoVerifier::new);
    if google.is_none() {
        info!("GOOGLE_CLIENT_ID not set, Google sign-in disabled");
    }

    let env = AuthEnvironment::new(codes, email, accounts, tokens, google, clock);
    let manager = OtpManager::new(
        env,
        OtpConfig::default()
            .with_expose_internal_errors(config.server.environment.is_development()),
    );
    let cookie = SessionCookieConfig::default()
        .with_max_age_days(config.auth.cookie_expires_in_days)
        .with_secure(config.auth.cookie_secure);

    let app = build_router(AuthHttpState::new(Arc::new(manager), cookie));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("Server stopped");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
