//! Route matchers.
//!
//! # Responsibilities
//! - Define the [`RouteMatcher`] seam consulted by the dispatch table
//! - Resolve ABI payloads to a codec by their header ([`HeaderRoutes`])
//! - Provide the ABI matcher ([`AbiRouter`]); URI and JSON matchers live
//!   in their own modules
//!
//! # Design Decisions
//! - A matcher that cannot interpret a payload reports `Unhandled` so the
//!   next matcher gets a chance
//! - Once a route is selected, decode failures are handler errors
//! - A headerless codec owns its whole scope; it cannot coexist with other
//!   codecs there

use std::collections::HashMap;

use tracing::debug;

use crate::abi::DecodedTuple;
use crate::codec::{is_valid_header, Codec, HEADER_HEX_LEN};
use crate::rollups::{AdvanceRequest, InspectRequest, Outbox, RollupInput};
use crate::routing::error::ConfigurationError;
use crate::routing::handler::{HandlerResult, RouteHandler};

/// What a matcher did with a request.
#[derive(Debug)]
pub enum RouteOutcome {
    /// No route of this matcher applies.
    Unhandled,
    /// A route was selected and its handler ran (or its payload failed to decode).
    Handled(HandlerResult),
}

impl RouteOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, RouteOutcome::Handled(_))
    }
}

/// A family of routes consulted in registration order by the dispatch table.
pub trait RouteMatcher: Send + Sync {
    /// Label for logs and metrics.
    fn name(&self) -> &'static str;

    fn advance(&self, _request: &AdvanceRequest, _outbox: &mut Outbox) -> RouteOutcome {
        RouteOutcome::Unhandled
    }

    fn inspect(&self, _request: &InspectRequest, _outbox: &mut Outbox) -> RouteOutcome {
        RouteOutcome::Unhandled
    }
}

/// Handler invoked with the tuple decoded by its codec.
pub type AbiHandler<R> = Box<dyn RouteHandler<R, DecodedTuple>>;

/// Codecs of one scope, keyed by header.
pub struct HeaderRoutes<R> {
    headerless: Option<(Codec, AbiHandler<R>)>,
    headered: HashMap<String, (Codec, AbiHandler<R>)>,
}

impl<R> Default for HeaderRoutes<R> {
    fn default() -> Self {
        Self {
            headerless: None,
            headered: HashMap::new(),
        }
    }
}

impl<R: RollupInput> HeaderRoutes<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `codec`, enforcing header shape, uniqueness and the
    /// headerless-exclusivity rule.
    pub fn insert(&mut self, codec: Codec, handler: AbiHandler<R>) -> Result<(), ConfigurationError> {
        match codec.header() {
            None => {
                if self.headerless.is_some() || !self.headered.is_empty() {
                    return Err(ConfigurationError::AmbiguousRoute(format!(
                        "headerless {} cannot share a scope with other codecs",
                        codec
                    )));
                }
                self.headerless = Some((codec, handler));
            }
            Some(header) => {
                if !is_valid_header(header) {
                    return Err(ConfigurationError::InvalidHeader(header.to_string()));
                }
                if let Some((existing, _)) = &self.headerless {
                    return Err(ConfigurationError::AmbiguousRoute(format!(
                        "{} cannot share a scope with headerless {}",
                        codec, existing
                    )));
                }
                let key = header.to_ascii_lowercase();
                if self.headered.contains_key(&key) {
                    return Err(ConfigurationError::DuplicateRoute(codec.to_string()));
                }
                self.headered.insert(key, (codec, handler));
            }
        }
        Ok(())
    }

    /// Pick the codec for a payload: the headerless codec unconditionally,
    /// otherwise the one whose header equals the first 32 bytes.
    pub fn resolve(&self, payload_hex: &str) -> Option<&(Codec, AbiHandler<R>)> {
        if let Some(entry) = &self.headerless {
            return Some(entry);
        }
        let prefix = payload_hex.get(..HEADER_HEX_LEN)?;
        self.headered.get(&prefix.to_ascii_lowercase())
    }

    /// Resolve, decode and run the handler.
    pub fn dispatch(&self, request: &R, outbox: &mut Outbox) -> RouteOutcome {
        let Some((codec, handler)) = self.resolve(request.payload()) else {
            return RouteOutcome::Unhandled;
        };
        debug!(codec = %codec, "Resolved ABI route");
        match codec.decode(request.payload()) {
            Ok(decoded) => RouteOutcome::Handled(handler.handle(request, &decoded, outbox)),
            Err(e) => RouteOutcome::Handled(Err(e.into())),
        }
    }

    pub fn len(&self) -> usize {
        self.headered.len() + usize::from(self.headerless.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Routes ABI payloads by header to handlers taking the decoded tuple.
#[derive(Default)]
pub struct AbiRouter {
    advance: HeaderRoutes<AdvanceRequest>,
    inspect: HeaderRoutes<InspectRequest>,
}

impl AbiRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_route<H>(&mut self, codec: Codec, handler: H) -> Result<&mut Self, ConfigurationError>
    where
        H: RouteHandler<AdvanceRequest, DecodedTuple> + 'static,
    {
        debug!(codec = %codec, "Created ABI advance route");
        self.advance.insert(codec, Box::new(handler))?;
        Ok(self)
    }

    pub fn inspect_route<H>(&mut self, codec: Codec, handler: H) -> Result<&mut Self, ConfigurationError>
    where
        H: RouteHandler<InspectRequest, DecodedTuple> + 'static,
    {
        debug!(codec = %codec, "Created ABI inspect route");
        self.inspect.insert(codec, Box::new(handler))?;
        Ok(self)
    }
}

impl RouteMatcher for AbiRouter {
    fn name(&self) -> &'static str {
        "abi"
    }

    fn advance(&self, request: &AdvanceRequest, outbox: &mut Outbox) -> RouteOutcome {
        self.advance.dispatch(request, outbox)
    }

    fn inspect(&self, request: &InspectRequest, outbox: &mut Outbox) -> RouteOutcome {
        self.inspect.dispatch(request, outbox)
    }
}
