//! Request processing loop.
//!
//! # Responsibilities
//! - Poll the node with `finish`, carrying the previous request's status
//! - Dispatch each request through the [`DispatchTable`]
//! - Flush the handler's outputs before reporting its status
//! - Stop as soon as shutdown is signalled
//!
//! # Data Flow
//! ```text
//! finish(status) ──202──▶ poll again
//!       │
//!       └─ request ─▶ DispatchTable ─▶ Outbox ─▶ send_output* ─▶ status
//! ```
//!
//! # Design Decisions
//! - Handler errors reject the request; they never stop the loop
//! - A failed output delivery rejects the request as well
//! - Unrouted requests are accepted without outputs and logged
//! - Transport errors are fatal for the loop

use std::time::Instant;

use thiserror::Error;
use tokio::sync::broadcast;
use tracing::Instrument;

use crate::observability::metrics;
use crate::observability::tracing::request_span;
use crate::rollups::{FinishStatus, Outbox, RollupRequest};
use crate::routing::{DispatchTable, Resolution};
use crate::transport::{RollupTransport, TransportError};

/// Why the loop stopped.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("runner cancelled")]
    Cancelled,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Drives a [`DispatchTable`] against a rollup node.
pub struct Runner<T> {
    table: DispatchTable,
    transport: T,
}

impl<T: RollupTransport> Runner<T> {
    pub fn new(table: DispatchTable, transport: T) -> Self {
        Self { table, transport }
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    /// Run until shutdown is signalled or the transport fails.
    ///
    /// Returns [`RunError::Cancelled`] on shutdown; a closed shutdown
    /// channel counts as a signal.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) -> Result<(), RunError> {
        tracing::info!("Runner started");
        let mut status = FinishStatus::Accept;
        loop {
            let next = tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("Runner cancelled");
                    return Err(RunError::Cancelled);
                }
                next = self.transport.finish(status) => next?,
            };

            match next {
                None => tracing::trace!("No pending rollup request, trying again"),
                Some(request) => status = self.process(request).await,
            }
        }
    }

    /// Dispatch one request, flush its outputs and decide its status.
    pub async fn process(&self, request: RollupRequest) -> FinishStatus {
        let span = request_span(&request);
        self.process_inner(request).instrument(span).await
    }

    async fn process_inner(&self, request: RollupRequest) -> FinishStatus {
        let start = Instant::now();
        let kind = request.kind();
        tracing::debug!(kind, "Received request");

        let mut outbox = Outbox::new();
        let resolution = match &request {
            RollupRequest::Advance(advance) => self.table.advance(advance, &mut outbox),
            RollupRequest::Inspect(inspect) => self.table.inspect(inspect, &mut outbox),
        };

        let mut status = match resolution {
            Resolution::Handled(route, Ok(())) => {
                tracing::debug!(route = %route, outputs = outbox.len(), "Request handled");
                FinishStatus::Accept
            }
            Resolution::Handled(route, Err(e)) => {
                tracing::error!(route = %route, error = %e, "Handler failed, rejecting");
                FinishStatus::Reject
            }
            Resolution::Unhandled => {
                tracing::warn!(kind, "No route matched, accepting without action");
                FinishStatus::Accept
            }
        };

        for output in outbox.outputs() {
            match self.transport.send_output(output).await {
                Ok(_) => metrics::record_output(output.endpoint()),
                Err(e) => {
                    tracing::error!(output = output.endpoint(), error = %e, "Failed to deliver output");
                    status = FinishStatus::Reject;
                    break;
                }
            }
        }

        metrics::record_request(kind, status.as_str(), start);
        status
    }
}
