//! JSON routes: the payload is a UTF-8 JSON object whose `route_key` member
//! names the route.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::rollups::hex::hex_to_str;
use crate::rollups::{AdvanceRequest, InspectRequest, Outbox, RollupInput};
use crate::routing::error::ConfigurationError;
use crate::routing::handler::RouteHandler;
use crate::routing::matcher::{RouteMatcher, RouteOutcome};

/// The decoded payload object handed to JSON route handlers.
pub type JsonObject = Map<String, Value>;

type JsonHandler<R> = Box<dyn RouteHandler<R, JsonObject>>;

/// Routes JSON payloads by the value of one member.
pub struct JsonRouter {
    route_key: String,
    advance: HashMap<String, JsonHandler<AdvanceRequest>>,
    inspect: HashMap<String, JsonHandler<InspectRequest>>,
}

impl JsonRouter {
    pub fn new(route_key: impl Into<String>) -> Result<Self, ConfigurationError> {
        let route_key = route_key.into();
        if route_key.is_empty() {
            return Err(ConfigurationError::InvalidRoute("empty JSON route key".into()));
        }
        Ok(Self {
            route_key,
            advance: HashMap::new(),
            inspect: HashMap::new(),
        })
    }

    pub fn route_key(&self) -> &str {
        &self.route_key
    }

    pub fn advance_route<H>(&mut self, route: &str, handler: H) -> Result<&mut Self, ConfigurationError>
    where
        H: RouteHandler<AdvanceRequest, JsonObject> + 'static,
    {
        insert_route(&mut self.advance, route, Box::new(handler))?;
        debug!(key = %self.route_key, route, "Created JSON advance route");
        Ok(self)
    }

    pub fn inspect_route<H>(&mut self, route: &str, handler: H) -> Result<&mut Self, ConfigurationError>
    where
        H: RouteHandler<InspectRequest, JsonObject> + 'static,
    {
        insert_route(&mut self.inspect, route, Box::new(handler))?;
        debug!(key = %self.route_key, route, "Created JSON inspect route");
        Ok(self)
    }

    /// Parse the payload and read the route member. `None` when the payload
    /// is not a JSON object or lacks a string route member.
    fn route_of(&self, payload: &str) -> Option<(String, JsonObject)> {
        let text = hex_to_str(payload).ok()?;
        let object = match serde_json::from_str::<Value>(&text).ok()? {
            Value::Object(object) => object,
            _ => return None,
        };
        let route = object.get(&self.route_key)?.as_str()?.to_string();
        Some((route, object))
    }

    fn dispatch<R: RollupInput>(
        &self,
        routes: &HashMap<String, JsonHandler<R>>,
        request: &R,
        outbox: &mut Outbox,
    ) -> RouteOutcome {
        if routes.is_empty() {
            return RouteOutcome::Unhandled;
        }
        let Some((route, object)) = self.route_of(request.payload()) else {
            trace!("Payload is not a routable JSON object");
            return RouteOutcome::Unhandled;
        };
        match routes.get(&route) {
            Some(handler) => {
                debug!(route = %route, "Resolved JSON route");
                RouteOutcome::Handled(handler.handle(request, &object, outbox))
            }
            None => RouteOutcome::Unhandled,
        }
    }
}

fn insert_route<R>(
    routes: &mut HashMap<String, JsonHandler<R>>,
    route: &str,
    handler: JsonHandler<R>,
) -> Result<(), ConfigurationError> {
    if route.is_empty() {
        return Err(ConfigurationError::InvalidRoute(route.to_string()));
    }
    if routes.contains_key(route) {
        return Err(ConfigurationError::DuplicateRoute(route.to_string()));
    }
    routes.insert(route.to_string(), handler);
    Ok(())
}

impl RouteMatcher for JsonRouter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn advance(&self, request: &AdvanceRequest, outbox: &mut Outbox) -> RouteOutcome {
        self.dispatch(&self.advance, request, outbox)
    }

    fn inspect(&self, request: &InspectRequest, outbox: &mut Outbox) -> RouteOutcome {
        self.dispatch(&self.inspect, request, outbox)
    }
}
