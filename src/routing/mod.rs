//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (metadata, hex payload)
//!     → router.rs (fixed address → known address → matchers → catch-all → default)
//!     → matcher.rs / uri.rs / json.rs (interpret payload, pick a route)
//!     → handler.rs (run handler against the request's Outbox)
//!     → Return: Resolution (route + handler result) or Unhandled
//!
//! Registration (at startup):
//!     DispatchTableBuilder
//!     → validate headers, addresses, duplicates, ambiguity
//!     → freeze as immutable DispatchTable
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - Deterministic: same input always resolves to the same handler
//! - First match wins, in a fixed priority order
//! - Misconfiguration fails at registration, never at dispatch

pub mod error;
pub mod handler;
pub mod json;
pub mod matcher;
pub mod router;
pub mod uri;

pub use error::ConfigurationError;
pub use handler::{AdvanceHandler, HandlerError, HandlerResult, InspectHandler, RouteHandler};
pub use json::{JsonObject, JsonRouter};
pub use matcher::{AbiRouter, HeaderRoutes, RouteMatcher, RouteOutcome};
pub use router::{DispatchTable, DispatchTableBuilder, Resolution, Route};
pub use uri::{match_uri, UriParams, UriRouter};
