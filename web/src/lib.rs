//! Axum integration shared by Wayfarer HTTP services.
//!
//! - [`AppError`]: status + machine code + message, rendered as JSON
//! - Extractors for correlation IDs, client IPs and session credentials
//! - Correlation ID middleware that tags every request span
//! - Liveness and readiness handlers
//!
//! # Example
//!
//! ```ignore
//! use wayfarer_web::{AppError, correlation_id_layer};
//! use axum::{Router, routing::get};
//!
//! let app = Router::new()
//!     .route("/health", get(wayfarer_web::handlers::health_check))
//!     .layer(correlation_id_layer());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

pub use error::{AppError, GENERIC_ERROR_MESSAGE};
pub use extractors::{ClientIp, CorrelationId, UserAgent, bearer_token, cookie_value};
pub use middleware::{CORRELATION_ID_HEADER, CorrelationIdExt, correlation_id_layer};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
