#![forbid(unsafe_code)]

use std::collections::HashMap;

use log::debug;
use poem::endpoint::BoxEndpoint;
use poem::http::{Method, StatusCode};
use poem::{Endpoint, EndpointExt, IntoResponse, Request, Response, Result};

// ***************************************************************************
//                               Route Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// RouteKey:
// ---------------------------------------------------------------------------
// A route is identified by an HTTP method and a literal path.  Paths are
// matched exactly and case-sensitively; the query string never participates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RouteKey {
    method: Method,
    path: String,
}

// ---------------------------------------------------------------------------
// FrontController:
// ---------------------------------------------------------------------------
/** The single entry point for all inbound requests.  Handlers are registered
 * in a route table keyed by (method, literal path).  A request that matches
 * no table entry receives a 404 with an empty body, including requests that
 * hit a known path with the wrong method.
 *
 * The table is immutable once the server starts, so it is shared across
 * worker tasks without locking.
 */
pub struct FrontController {
    routes: HashMap<RouteKey, BoxEndpoint<'static, Response>>,
}

impl FrontController {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /** Register a handler under a literal method/path pair.  Registering the
     * same pair twice replaces the earlier handler.
     */
    pub fn at(mut self, method: Method, path: &str, ep: impl Endpoint + 'static) -> Self {
        let key = RouteKey { method, path: path.to_string() };
        self.routes.insert(key, ep.map_to_response().boxed());
        self
    }
}

impl Default for FrontController {
    fn default() -> Self {
        Self::new()
    }
}

// ***************************************************************************
//                              Endpoint Impl
// ***************************************************************************
impl Endpoint for FrontController {
    type Output = Response;

    async fn call(&self, req: Request) -> Result<Self::Output> {
        // Dispatch on the exact method and path.
        let key = RouteKey {
            method: req.method().clone(),
            path: req.uri().path().to_string(),
        };
        match self.routes.get(&key) {
            Some(ep) => ep.call(req).await,
            None => {
                debug!("No route matches {} {}.", key.method, key.path);
                Ok(StatusCode::NOT_FOUND.into_response())
            },
        }
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;
    use poem::handler;
    use poem::test::TestClient;

    #[handler]
    fn probe() -> String {
        "probe".to_string()
    }

    fn controller() -> FrontController {
        FrontController::new().at(Method::GET, "/probe", probe)
    }

    #[tokio::test]
    async fn registered_route_is_dispatched() {
        let cli = TestClient::new(controller());
        let resp = cli.get("/probe").send().await;
        resp.assert_status_is_ok();
        resp.assert_text("probe").await;
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let cli = TestClient::new(controller());
        let resp = cli.get("/unknown").send().await;
        resp.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn wrong_method_is_404() {
        // A known path with the wrong method misses the table entirely.
        let cli = TestClient::new(controller());
        let resp = cli.post("/probe").send().await;
        resp.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn no_match_has_empty_body() {
        let cli = TestClient::new(controller());
        let resp = cli.get("/unknown").send().await;
        resp.assert_status(StatusCode::NOT_FOUND);
        resp.assert_text("").await;
    }

    #[tokio::test]
    async fn trailing_slash_is_not_normalized() {
        let cli = TestClient::new(controller());
        let resp = cli.get("/probe/").send().await;
        resp.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn query_string_does_not_affect_matching() {
        let cli = TestClient::new(controller());
        let resp = cli.get("/probe").query("x", &"1").send().await;
        resp.assert_status_is_ok();
    }
}
