//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to the rollup node:
//!     → transport attempts the call
//!     → On connection failure: backoff.rs (exponential delay + jitter)
//!     → retry until retries.max_attempts is reached
//! ```
//!
//! # Design Decisions
//! - Only connection-level failures are retried; a status response from
//!   the node is final
//! - Jittered backoff avoids synchronized retries across instances

pub mod backoff;

pub use backoff::{calculate_backoff, retry_delay};
