//! Request spans.
//!
//! # Responsibilities
//! - Create one span per rollup request carrying a correlation ID
//! - Attach input metadata so handler logs can be tied to an input
//!
//! # Design Decisions
//! - Correlation IDs are UUID v4, generated locally; the node has no
//!   notion of them

use tracing::Span;
use uuid::Uuid;

use crate::rollups::RollupRequest;

/// Span wrapping the processing of one request.
pub fn request_span(request: &RollupRequest) -> Span {
    let request_id = Uuid::new_v4();
    match request {
        RollupRequest::Advance(advance) => tracing::info_span!(
            "advance",
            request_id = %request_id,
            input_index = advance.metadata.input_index,
            sender = %advance.metadata.msg_sender,
        ),
        RollupRequest::Inspect(_) => tracing::info_span!("inspect", request_id = %request_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollups::InspectRequest;

    #[test]
    fn test_span_is_created() {
        let span = request_span(&RollupRequest::Inspect(InspectRequest::default()));
        let _entered = span.enter();
    }
}
