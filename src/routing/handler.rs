//! Handler traits.
//!
//! Every handler receives the request and the [`Outbox`] it may emit outputs
//! into. Routed handlers also receive what the route extracted from the
//! payload: a decoded tuple, URI parameters or a JSON object.
//!
//! All traits are implemented for plain closures. Closure arguments need type
//! annotations so the compiler picks the higher-ranked signature:
//!
//! ```ignore
//! builder.handle_advance(|req: &AdvanceRequest, out: &mut Outbox| -> HandlerResult {
//!     out.notice(req.payload.clone());
//!     Ok(())
//! })?;
//! ```

use crate::rollups::{AdvanceRequest, InspectRequest, Outbox};

/// Error returned by a handler. Any error marks the request as rejected.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result of running a handler.
pub type HandlerResult = Result<(), HandlerError>;

/// Handles state-changing inputs.
pub trait AdvanceHandler: Send + Sync {
    fn handle(&self, request: &AdvanceRequest, outbox: &mut Outbox) -> HandlerResult;
}

/// Handles read-only queries.
pub trait InspectHandler: Send + Sync {
    fn handle(&self, request: &InspectRequest, outbox: &mut Outbox) -> HandlerResult;
}

/// Handles a request of type `R` along with route parameters `P`.
pub trait RouteHandler<R, P>: Send + Sync {
    fn handle(&self, request: &R, params: &P, outbox: &mut Outbox) -> HandlerResult;
}

impl<F> AdvanceHandler for F
where
    F: Fn(&AdvanceRequest, &mut Outbox) -> HandlerResult + Send + Sync,
{
    fn handle(&self, request: &AdvanceRequest, outbox: &mut Outbox) -> HandlerResult {
        self(request, outbox)
    }
}

impl<F> InspectHandler for F
where
    F: Fn(&InspectRequest, &mut Outbox) -> HandlerResult + Send + Sync,
{
    fn handle(&self, request: &InspectRequest, outbox: &mut Outbox) -> HandlerResult {
        self(request, outbox)
    }
}

impl<R, P, F> RouteHandler<R, P> for F
where
    F: Fn(&R, &P, &mut Outbox) -> HandlerResult + Send + Sync,
{
    fn handle(&self, request: &R, params: &P, outbox: &mut Outbox) -> HandlerResult {
        self(request, params, outbox)
    }
}
