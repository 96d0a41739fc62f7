//! # lizenzserver-observability
//!
//! Observability-Crate fuer den Lizenzserver:
//! - Prometheus-kompatible Metriken (`/metrics`)
//! - Health-Check-Endpunkt (`/health`)
//! - Structured Logging via tracing-subscriber
//! - Request-Metriken als Axum-Middleware

pub mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;

pub use health::{health_router, DbPruefung, HealthResponse, HealthState, HealthStatus};
pub use logging::logging_initialisieren;
pub use metrics::{metrics_router, LizenzMetriken};
pub use middleware::{metriken_middleware, request_timing_layer};
