//! Rollup node transport.
//!
//! # Data Flow
//! ```text
//! runner
//!     → RollupTransport::finish(status)       → POST /finish
//!         202            → Ok(None)  (nothing pending, poll again)
//!         200 + envelope → Ok(Some(RollupRequest))
//!     → RollupTransport::send_output(output)  → POST /notice | /voucher | /report | /exception
//! ```
//!
//! # Design Decisions
//! - The runner only sees the trait, so tests can script the node
//! - Retries and backoff live in the HTTP adapter, nowhere else

pub mod http;

use std::future::Future;

use thiserror::Error;

use crate::rollups::{FinishStatus, Output, RollupRequest};

pub use self::http::HttpTransport;

/// Errors talking to the rollup node.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("rollup server URL not configured; set server.url or ROLLUP_HTTP_SERVER_URL")]
    MissingUrl,

    #[error("invalid rollup server URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request to /{endpoint} failed: {source}")]
    Http {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("/{endpoint} returned status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    #[error("malformed /{endpoint} response: {reason}")]
    Decode {
        endpoint: &'static str,
        reason: String,
    },
}

/// Connection to the rollup node.
pub trait RollupTransport: Send + Sync {
    /// Report the status of the previous request and wait for the next one.
    /// `Ok(None)` means nothing is pending yet.
    fn finish(
        &self,
        status: FinishStatus,
    ) -> impl Future<Output = Result<Option<RollupRequest>, TransportError>> + Send;

    /// Deliver one output. Returns the index assigned by the node to
    /// notices and vouchers.
    fn send_output(
        &self,
        output: &Output,
    ) -> impl Future<Output = Result<Option<u64>, TransportError>> + Send;
}
