//! URI-style routes over UTF-8 payloads.
//!
//! Patterns are literal paths with `:name` placeholders, e.g.
//! `/balance/:address`. A placeholder captures everything up to the
//! pattern's next literal character or `/`.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::rollups::hex::hex_to_str;
use crate::rollups::{AdvanceRequest, InspectRequest, Outbox, RollupInput};
use crate::routing::error::ConfigurationError;
use crate::routing::handler::RouteHandler;
use crate::routing::matcher::{RouteMatcher, RouteOutcome};

/// Placeholder values captured from a path.
pub type UriParams = HashMap<String, String>;

/// Match `path` against `pattern`, returning the captured placeholders.
///
/// - A pattern ending in `/` (other than `/` itself) matches any longer path
///   it prefixes
/// - A trailing `/` left in the pattern after the path is consumed still matches
/// - Otherwise the whole pattern must be consumed
pub fn match_uri(pattern: &str, path: &str) -> Option<UriParams> {
    let p = pattern.as_bytes();
    let s = path.as_bytes();
    let mut params = UriParams::new();
    let (mut i, mut j) = (0, 0);

    while i < s.len() {
        if j >= p.len() {
            return (pattern != "/" && pattern.ends_with('/')).then_some(params);
        }
        if p[j] == b':' {
            let name_start = j + 1;
            j = name_start;
            while j < p.len() && (p[j].is_ascii_alphanumeric() || p[j] == b'_') {
                j += 1;
            }
            let name = String::from_utf8_lossy(&p[name_start..j]).into_owned();
            let stop = p.get(j).copied();

            let value_start = i;
            while i < s.len() && s[i] != b'/' && Some(s[i]) != stop {
                i += 1;
            }
            params.insert(name, String::from_utf8_lossy(&s[value_start..i]).into_owned());
        } else if s[i] == p[j] {
            i += 1;
            j += 1;
        } else {
            return None;
        }
    }

    let rest = &p[j..];
    (rest.is_empty() || (rest == b"/" && j > 0)).then_some(params)
}

type UriHandler<R> = Box<dyn RouteHandler<R, UriParams>>;

/// Routes UTF-8 payloads by path pattern, in registration order.
#[derive(Default)]
pub struct UriRouter {
    advance: Vec<(String, UriHandler<AdvanceRequest>)>,
    inspect: Vec<(String, UriHandler<InspectRequest>)>,
}

impl UriRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_route<H>(&mut self, pattern: &str, handler: H) -> Result<&mut Self, ConfigurationError>
    where
        H: RouteHandler<AdvanceRequest, UriParams> + 'static,
    {
        check_pattern(pattern, self.advance.iter().map(|(p, _)| p.as_str()))?;
        debug!(route = pattern, "Created URI advance route");
        self.advance.push((pattern.to_string(), Box::new(handler)));
        Ok(self)
    }

    pub fn inspect_route<H>(&mut self, pattern: &str, handler: H) -> Result<&mut Self, ConfigurationError>
    where
        H: RouteHandler<InspectRequest, UriParams> + 'static,
    {
        check_pattern(pattern, self.inspect.iter().map(|(p, _)| p.as_str()))?;
        debug!(route = pattern, "Created URI inspect route");
        self.inspect.push((pattern.to_string(), Box::new(handler)));
        Ok(self)
    }
}

fn check_pattern<'a>(
    pattern: &str,
    mut existing: impl Iterator<Item = &'a str>,
) -> Result<(), ConfigurationError> {
    if pattern.is_empty() {
        return Err(ConfigurationError::InvalidRoute(pattern.to_string()));
    }
    if existing.any(|p| p == pattern) {
        return Err(ConfigurationError::DuplicateRoute(pattern.to_string()));
    }
    Ok(())
}

fn dispatch<R: RollupInput>(
    routes: &[(String, UriHandler<R>)],
    request: &R,
    outbox: &mut Outbox,
) -> RouteOutcome {
    if routes.is_empty() {
        return RouteOutcome::Unhandled;
    }
    let Ok(path) = hex_to_str(request.payload()) else {
        trace!("Payload is not utf-8 text; skipping URI routes");
        return RouteOutcome::Unhandled;
    };
    for (pattern, handler) in routes {
        if let Some(params) = match_uri(pattern, &path) {
            debug!(route = %pattern, "Resolved URI route");
            return RouteOutcome::Handled(handler.handle(request, &params, outbox));
        }
    }
    RouteOutcome::Unhandled
}

impl RouteMatcher for UriRouter {
    fn name(&self) -> &'static str {
        "uri"
    }

    fn advance(&self, request: &AdvanceRequest, outbox: &mut Outbox) -> RouteOutcome {
        dispatch(&self.advance, request, outbox)
    }

    fn inspect(&self, request: &InspectRequest, outbox: &mut Outbox) -> RouteOutcome {
        dispatch(&self.inspect, request, outbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollups::hex::str_to_hex;
    use crate::routing::handler::HandlerResult;

    #[test]
    fn test_placeholder_capture() {
        let params = match_uri("/balance/:address", "/balance/0xDEAD").unwrap();
        assert_eq!(params.get("address").map(String::as_str), Some("0xDEAD"));

        let params = match_uri("/set/:key/:value", "/set/a/b").unwrap();
        assert_eq!(params["key"], "a");
        assert_eq!(params["value"], "b");
    }

    #[test]
    fn test_placeholder_stops_at_literal() {
        let params = match_uri("/pair/:a-:b", "/pair/x-y").unwrap();
        assert_eq!(params["a"], "x");
        assert_eq!(params["b"], "y");
    }

    #[test]
    fn test_rejects_extra_segments() {
        assert!(match_uri("/set/:key/:value", "/set/a/b/c").is_none());
        assert!(match_uri("/set/:key/:value", "/set/a").is_none());
        assert!(match_uri("/a", "/b").is_none());
        assert!(match_uri("/", "/anything").is_none());
    }

    #[test]
    fn test_trailing_slash() {
        assert!(match_uri("/static/", "/static/css/site.css").is_some());
        assert!(match_uri("/static/", "/static").is_some());
        assert!(match_uri("/static", "/static/").is_none());
    }

    #[test]
    fn test_router_order_and_registration() {
        let mut router = UriRouter::new();
        router
            .inspect_route("/echo/:word", |_: &InspectRequest, params: &UriParams, out: &mut Outbox| -> HandlerResult {
                out.report_text(&params["word"]);
                Ok(())
            })
            .unwrap();
        assert!(matches!(
            router.inspect_route("/echo/:word", |_: &InspectRequest, _: &UriParams, _: &mut Outbox| -> HandlerResult { Ok(()) }),
            Err(ConfigurationError::DuplicateRoute(_))
        ));
        assert!(matches!(
            router.advance_route("", |_: &AdvanceRequest, _: &UriParams, _: &mut Outbox| -> HandlerResult { Ok(()) }),
            Err(ConfigurationError::InvalidRoute(_))
        ));

        let mut outbox = Outbox::new();
        let request = InspectRequest {
            payload: str_to_hex("/echo/hello"),
        };
        assert!(router.inspect(&request, &mut outbox).is_handled());
        assert_eq!(outbox.outputs().len(), 1);

        let binary = InspectRequest {
            payload: "0xff00".into(),
        };
        assert!(!router.inspect(&binary, &mut outbox).is_handled());
    }
}
