//! # hoersaal-observability
//!
//! Observability-Crate fuer Hoersaal:
//! - Prometheus-kompatible Metriken (`/metrics`)
//! - Structured Logging via tracing-subscriber (text oder JSON)
//! - Request-Timing Middleware

pub mod logging;
pub mod metrics;
pub mod middleware;

pub use logging::logging_initialisieren;
pub use metrics::{metrics_router, HoersaalMetrics};
pub use middleware::timing_middleware;
