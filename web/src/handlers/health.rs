//! Health check endpoints.
//!
//! Used by load balancers and orchestrators to decide whether the service
//! is alive and whether it should receive traffic.

use axum::{Json, http::StatusCode};
use serde::Serialize;

/// Liveness response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Liveness check.
///
/// Returns 200 OK while the process is running. Dependencies are not
/// consulted.
///
/// ```text
/// GET /health
/// {"status":"ok","version":"0.1.0"}
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// Readiness response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadinessResponse {
    /// `true` when every dependency answered.
    pub ready: bool,
    /// Account database reachable.
    pub database: bool,
    /// Shared cache reachable.
    pub cache: bool,
}

impl ReadinessResponse {
    /// Combine dependency probes into a response.
    ///
    /// The service stays ready while the cache is down, since one-time codes
    /// fall back to process memory. Only the database gates readiness.
    #[must_use]
    pub const fn new(database: bool, cache: bool) -> Self {
        Self {
            ready: database,
            database,
            cache,
        }
    }

    /// 200 when ready, 503 otherwise.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        if self.ready {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simple_health_check() {
        let (status, Json(body)) = health_check().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
    }

    #[test]
    fn test_cache_outage_keeps_service_ready() {
        let readiness = ReadinessResponse::new(true, false);
        assert!(readiness.ready);
        assert_eq!(readiness.status(), StatusCode::OK);
    }

    #[test]
    fn test_database_outage_is_not_ready() {
        let readiness = ReadinessResponse::new(false, true);
        assert!(!readiness.ready);
        assert_eq!(readiness.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
