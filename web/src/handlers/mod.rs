//! HTTP handlers shared across services.

pub mod health;

pub use health::{ReadinessResponse, health_check};
