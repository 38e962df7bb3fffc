//! The route table: registered patterns and the handlers behind them.

use std::sync::Arc;

use tracing::{debug, info};

use crate::dispatch::{Method, OperationKind, ParsedRequest, PipelineOutcome, Respond};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::routing::{Identifiers, RouteError, RoutePattern};

/// Placeholder appended by `subscribe_resource` for the single-resource route.
const RESOURCE_ID: &str = "{id}";

struct Route {
    pattern: RoutePattern,
    handler: Arc<dyn Respond>,
}

/// The result of looking a path up in the table.
pub struct RouteMatch<'a> {
    pub pattern: &'a RoutePattern,
    pub identifiers: Identifiers,
    pub handler: &'a Arc<dyn Respond>,
}

/// Maps route patterns to handlers, in registration order.
///
/// Built once at startup, then shared read-only across connections.
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for `route`.
    ///
    /// Fails when the route string is invalid. Registering the same route
    /// string again replaces its handler but keeps its original position.
    pub fn subscribe(
        &mut self,
        route: &str,
        handler: impl Respond + 'static,
    ) -> Result<(), RouteError> {
        self.subscribe_shared(route, Arc::new(handler))
    }

    pub fn subscribe_shared(
        &mut self,
        route: &str,
        handler: Arc<dyn Respond>,
    ) -> Result<(), RouteError> {
        let pattern = RoutePattern::compile(route)?;

        if let Some(existing) = self.routes.iter_mut().find(|r| r.pattern == pattern) {
            info!(route = %pattern, "route handler replaced");
            existing.handler = handler;
            return Ok(());
        }

        info!(route = %pattern, collection = pattern.is_collection(), "route registered");
        self.routes.push(Route { pattern, handler });
        Ok(())
    }

    /// Registers `route` as a collection and `route/{id}` as its single
    /// resource, both served by the same handler.
    pub fn subscribe_resource(
        &mut self,
        route: &str,
        handler: impl Respond + 'static,
    ) -> Result<(), RouteError> {
        let handler: Arc<dyn Respond> = Arc::new(handler);
        let item_route = format!("{}/{}", route, RESOURCE_ID);

        // Validate both before registering either.
        RoutePattern::compile(route)?;
        RoutePattern::compile(&item_route)?;

        self.subscribe_shared(route, handler.clone())?;
        self.subscribe_shared(&item_route, handler)
    }

    /// Finds the first registered route matching `path`.
    pub fn find(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.routes.iter().find_map(|route| {
            route.pattern.matches(path).map(|identifiers| RouteMatch {
                pattern: &route.pattern,
                identifiers,
                handler: &route.handler,
            })
        })
    }

    /// Produces the response for one request. Exactly one outcome is
    /// rendered per call.
    pub async fn dispatch(&self, request: &Request) -> Response {
        let outcome = self.outcome(request).await;

        info!(
            method = %request.method,
            path = %request.path,
            status = outcome.status().as_u16(),
            "request dispatched"
        );

        outcome.into_response()
    }

    /// Routes and runs a request, returning the outcome before rendering.
    pub async fn outcome(&self, request: &Request) -> PipelineOutcome {
        let Some(found) = self.find(request.path_only()) else {
            debug!(path = %request.path, "no route matched");
            return PipelineOutcome::route_not_found();
        };

        let method = Method::parse(&request.method);
        let kind = OperationKind::classify(&request.method, found.pattern.is_collection());
        let parsed = ParsedRequest::from_request(found.identifiers, request);

        debug!(route = %found.pattern, operation = ?kind, "route matched");
        found.handler.respond(method, kind, &parsed).await
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registered routes, in matching order.
    pub fn routes(&self) -> impl Iterator<Item = &RoutePattern> {
        self.routes.iter().map(|r| &r.pattern)
    }
}
