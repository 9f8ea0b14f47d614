#![forbid(unsafe_code)]

use poem::web::Query;
use poem::{handler, Request};
use serde::Deserialize;

use crate::utils::greeting::make_greeting;
use crate::utils::web_utils::{debug_request, RequestDebug};

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
#[derive(Debug, Deserialize)]
pub struct ReqHello
{
    name: Option<String>,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqHello {
    type Req = ReqHello;
    fn get_request_info(&self) -> String {
        let mut s = String::with_capacity(255);
        s.push_str("  Request parameters:");
        s.push_str("\n    name: ");
        s.push_str(self.name.as_deref().unwrap_or("<absent>"));
        s
    }
}

// ***************************************************************************
//                                 Endpoint
// ***************************************************************************
// ---------------------------------------------------------------------------
// say_hello:
// ---------------------------------------------------------------------------
/** Greet the caller by the name given in the optional query parameter.
 * Returning a String lets poem set the 200 status and plain-text content
 * type; the greeting itself never fails.
 */
#[handler]
pub async fn say_hello(http_req: &Request, Query(req): Query<ReqHello>) -> String {
    // Conditional logging depending on log level.
    debug_request(http_req, &req);

    make_greeting(req.name.as_deref())
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;
    use poem::http::Method;
    use poem::test::TestClient;

    use crate::api::dispatch::FrontController;

    fn app() -> FrontController {
        FrontController::new().at(Method::GET, "/hello", say_hello)
    }

    #[tokio::test]
    async fn hello_without_name() {
        let cli = TestClient::new(app());
        let resp = cli.get("/hello").send().await;
        resp.assert_status_is_ok();
        resp.assert_content_type("text/plain; charset=utf-8");
        resp.assert_text("Hello, World!").await;
    }

    #[tokio::test]
    async fn hello_with_empty_name() {
        // An empty name is treated the same as an absent one.
        let cli = TestClient::new(app());
        let resp = cli.get("/hello").query("name", &"").send().await;
        resp.assert_status_is_ok();
        resp.assert_text("Hello, World!").await;
    }

    #[tokio::test]
    async fn hello_with_name() {
        let cli = TestClient::new(app());
        let resp = cli.get("/hello").query("name", &"Ada").send().await;
        resp.assert_status_is_ok();
        resp.assert_content_type("text/plain; charset=utf-8");
        resp.assert_text("Hello, Ada!").await;
    }

    #[tokio::test]
    async fn hello_with_encoded_name() {
        let cli = TestClient::new(app());
        let resp = cli.get("/hello").query("name", &"Grace Hopper").send().await;
        resp.assert_status_is_ok();
        resp.assert_text("Hello, Grace Hopper!").await;
    }

    #[tokio::test]
    async fn post_hello_is_404() {
        let cli = TestClient::new(app());
        let resp = cli.post("/hello").query("name", &"Ada").send().await;
        resp.assert_status(poem::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn other_path_is_404() {
        let cli = TestClient::new(app());
        let resp = cli.get("/goodbye").send().await;
        resp.assert_status(poem::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn repeated_requests_are_identical() {
        let cli = TestClient::new(app());
        for _ in 0..3 {
            let resp = cli.get("/hello").query("name", &"Ada").send().await;
            resp.assert_status_is_ok();
            resp.assert_text("Hello, Ada!").await;
        }
    }
}
