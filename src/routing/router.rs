//! Dispatch table: registration and request resolution.
//!
//! # Responsibilities
//! - Collect handlers through [`DispatchTableBuilder`], rejecting ambiguous
//!   or malformed registrations
//! - Freeze them into an immutable [`DispatchTable`]
//! - Resolve each request to exactly one handler, or none
//!
//! # Resolution order (advance)
//! ```text
//! 1. fixed-address routes   (sender match is final, even if no codec fits)
//! 2. well-known addresses   (portals, relay)
//! 3. route matchers         (registration order: ABI, URI, JSON, ...)
//! 4. catch-all advance handler
//! 5. default handler
//! ```
//! Inspect requests skip steps 1 and 2.
//!
//! # Design Decisions
//! - Immutable after construction (shared without locks)
//! - Sender addresses compared lowercased
//! - Single-slot handlers reject a second registration instead of replacing it

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::abi::DecodedTuple;
use crate::codec::Codec;
use crate::rollups::addresses::{is_valid_address, KnownAddresses};
use crate::rollups::{AdvanceRequest, InspectRequest, Outbox};
use crate::routing::error::ConfigurationError;
use crate::routing::handler::{AdvanceHandler, HandlerResult, InspectHandler, RouteHandler};
use crate::routing::matcher::{AbiHandler, HeaderRoutes, RouteMatcher, RouteOutcome};

/// The step of the resolution order that selected a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    FixedAddress,
    KnownAddress,
    Matcher(&'static str),
    CatchAll,
    Default,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::FixedAddress => write!(f, "fixed_address"),
            Route::KnownAddress => write!(f, "known_address"),
            Route::Matcher(name) => write!(f, "{}", name),
            Route::CatchAll => write!(f, "catch_all"),
            Route::Default => write!(f, "default"),
        }
    }
}

/// Result of resolving one request.
#[derive(Debug)]
pub enum Resolution {
    Handled(Route, HandlerResult),
    Unhandled,
}

impl Resolution {
    pub fn is_handled(&self) -> bool {
        matches!(self, Resolution::Handled(..))
    }

    /// The route that handled the request, if any.
    pub fn route(&self) -> Option<Route> {
        match self {
            Resolution::Handled(route, _) => Some(*route),
            Resolution::Unhandled => None,
        }
    }
}

enum FixedRoute {
    Handler(Box<dyn AdvanceHandler>),
    Abi(HeaderRoutes<AdvanceRequest>),
}

/// Collects handlers and routes before the table is frozen.
#[derive(Default)]
pub struct DispatchTableBuilder {
    default: Option<Box<dyn InspectHandler>>,
    advance: Option<Box<dyn AdvanceHandler>>,
    inspect: Option<Box<dyn InspectHandler>>,
    known_addresses: KnownAddresses,
    rollups: Option<Box<dyn AdvanceHandler>>,
    fixed: HashMap<String, FixedRoute>,
    matchers: Vec<Box<dyn RouteMatcher>>,
}

impl DispatchTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the framework addresses used by [`Self::handle_rollups_fixed_addresses`].
    /// Once that handler is registered the set can be replaced but not emptied.
    pub fn known_addresses(&mut self, addresses: KnownAddresses) -> Result<&mut Self, ConfigurationError> {
        if self.rollups.is_some() && addresses.is_empty() {
            return Err(ConfigurationError::UninitializedAddresses);
        }
        self.known_addresses = addresses;
        Ok(self)
    }

    /// Last-resort handler for both request kinds. Advance requests reach it
    /// with their payload only.
    pub fn handle_default<H>(&mut self, handler: H) -> Result<&mut Self, ConfigurationError>
    where
        H: InspectHandler + 'static,
    {
        let handler: Box<dyn InspectHandler> = Box::new(handler);
        set_once(&mut self.default, handler, "default")?;
        Ok(self)
    }

    /// Catch-all for advance requests no route claimed.
    pub fn handle_advance<H>(&mut self, handler: H) -> Result<&mut Self, ConfigurationError>
    where
        H: AdvanceHandler + 'static,
    {
        let handler: Box<dyn AdvanceHandler> = Box::new(handler);
        set_once(&mut self.advance, handler, "advance")?;
        Ok(self)
    }

    /// Catch-all for inspect requests no route claimed.
    pub fn handle_inspect<H>(&mut self, handler: H) -> Result<&mut Self, ConfigurationError>
    where
        H: InspectHandler + 'static,
    {
        let handler: Box<dyn InspectHandler> = Box::new(handler);
        set_once(&mut self.inspect, handler, "inspect")?;
        Ok(self)
    }

    /// Route every advance request sent by a well-known framework address
    /// to `handler`. The addresses must be set beforehand.
    pub fn handle_rollups_fixed_addresses<H>(&mut self, handler: H) -> Result<&mut Self, ConfigurationError>
    where
        H: AdvanceHandler + 'static,
    {
        if self.known_addresses.is_empty() {
            return Err(ConfigurationError::UninitializedAddresses);
        }
        let handler: Box<dyn AdvanceHandler> = Box::new(handler);
        set_once(&mut self.rollups, handler, "rollups fixed address")?;
        debug!(addresses = self.known_addresses.len(), "Created rollups fixed address route");
        Ok(self)
    }

    /// Route every advance request sent by `address` to `handler`.
    pub fn handle_fixed_address<H>(&mut self, address: &str, handler: H) -> Result<&mut Self, ConfigurationError>
    where
        H: AdvanceHandler + 'static,
    {
        let key = address_key(address)?;
        if self.fixed.contains_key(&key) {
            return Err(ConfigurationError::DuplicateRoute(format!("fixed address {}", address)));
        }
        debug!(address = %key, "Created fixed address route");
        self.fixed.insert(key, FixedRoute::Handler(Box::new(handler)));
        Ok(self)
    }

    /// Route advance requests sent by `address` whose payload fits `codec`.
    /// Requests from `address` that fit none of its codecs stay unhandled.
    pub fn handle_fixed_address_route<H>(
        &mut self,
        address: &str,
        codec: Codec,
        handler: H,
    ) -> Result<&mut Self, ConfigurationError>
    where
        H: RouteHandler<AdvanceRequest, DecodedTuple> + 'static,
    {
        let key = address_key(address)?;
        debug!(address = %key, codec = %codec, "Created fixed address ABI route");
        let handler: AbiHandler<AdvanceRequest> = Box::new(handler);
        match self.fixed.get_mut(&key) {
            Some(FixedRoute::Abi(routes)) => routes.insert(codec, handler)?,
            Some(FixedRoute::Handler(_)) => {
                return Err(ConfigurationError::DuplicateRoute(format!(
                    "fixed address {} already has a plain handler",
                    address
                )))
            }
            None => {
                let mut routes = HeaderRoutes::new();
                routes.insert(codec, handler)?;
                self.fixed.insert(key, FixedRoute::Abi(routes));
            }
        }
        Ok(self)
    }

    /// Append a route matcher. Matchers are consulted in the order added.
    pub fn route_matcher<M>(&mut self, matcher: M) -> &mut Self
    where
        M: RouteMatcher + 'static,
    {
        debug!(matcher = matcher.name(), "Added route matcher");
        self.matchers.push(Box::new(matcher));
        self
    }

    /// Freeze the registrations.
    pub fn build(self) -> DispatchTable {
        DispatchTable {
            default: self.default,
            advance: self.advance,
            inspect: self.inspect,
            known_addresses: self.known_addresses,
            rollups: self.rollups,
            fixed: self.fixed,
            matchers: self.matchers,
        }
    }
}

fn set_once<T: ?Sized>(
    slot: &mut Option<Box<T>>,
    handler: Box<T>,
    kind: &'static str,
) -> Result<(), ConfigurationError> {
    if slot.is_some() {
        return Err(ConfigurationError::HandlerAlreadySet(kind));
    }
    *slot = Some(handler);
    Ok(())
}

fn address_key(address: &str) -> Result<String, ConfigurationError> {
    if !is_valid_address(address) {
        return Err(ConfigurationError::InvalidAddress(address.to_string()));
    }
    Ok(address.to_ascii_lowercase())
}

/// Immutable routing state consulted for every request.
pub struct DispatchTable {
    default: Option<Box<dyn InspectHandler>>,
    advance: Option<Box<dyn AdvanceHandler>>,
    inspect: Option<Box<dyn InspectHandler>>,
    known_addresses: KnownAddresses,
    rollups: Option<Box<dyn AdvanceHandler>>,
    fixed: HashMap<String, FixedRoute>,
    matchers: Vec<Box<dyn RouteMatcher>>,
}

impl DispatchTable {
    pub fn builder() -> DispatchTableBuilder {
        DispatchTableBuilder::new()
    }

    /// Resolve and run the handler for an advance request.
    pub fn advance(&self, request: &AdvanceRequest, outbox: &mut Outbox) -> Resolution {
        let sender = request.metadata.msg_sender.to_ascii_lowercase();

        if let Some(fixed) = self.fixed.get(&sender) {
            return match fixed {
                FixedRoute::Handler(handler) => {
                    Resolution::Handled(Route::FixedAddress, handler.handle(request, outbox))
                }
                FixedRoute::Abi(routes) => match routes.dispatch(request, outbox) {
                    RouteOutcome::Handled(result) => Resolution::Handled(Route::FixedAddress, result),
                    RouteOutcome::Unhandled => {
                        debug!(sender = %sender, "No codec of the fixed address route fits the payload");
                        Resolution::Unhandled
                    }
                },
            };
        }

        if let Some(handler) = &self.rollups {
            if self.known_addresses.contains(&sender) {
                return Resolution::Handled(Route::KnownAddress, handler.handle(request, outbox));
            }
        }

        for matcher in &self.matchers {
            if let RouteOutcome::Handled(result) = matcher.advance(request, outbox) {
                return Resolution::Handled(Route::Matcher(matcher.name()), result);
            }
        }

        if let Some(handler) = &self.advance {
            return Resolution::Handled(Route::CatchAll, handler.handle(request, outbox));
        }

        if let Some(handler) = &self.default {
            let inspect = InspectRequest {
                payload: request.payload.clone(),
            };
            return Resolution::Handled(Route::Default, handler.handle(&inspect, outbox));
        }

        Resolution::Unhandled
    }

    /// Resolve and run the handler for an inspect request.
    pub fn inspect(&self, request: &InspectRequest, outbox: &mut Outbox) -> Resolution {
        for matcher in &self.matchers {
            if let RouteOutcome::Handled(result) = matcher.inspect(request, outbox) {
                return Resolution::Handled(Route::Matcher(matcher.name()), result);
            }
        }

        if let Some(handler) = &self.inspect {
            return Resolution::Handled(Route::CatchAll, handler.handle(request, outbox));
        }

        if let Some(handler) = &self.default {
            return Resolution::Handled(Route::Default, handler.handle(request, outbox));
        }

        Resolution::Unhandled
    }
}
