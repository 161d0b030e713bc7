//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Runner and transport produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!     → tracing.rs (per-request spans with correlation IDs)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape), when enabled
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line of a request via its span
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
pub mod tracing;

pub use logging::init_logging;
