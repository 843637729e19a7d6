//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Register a path, get a
//! handler. Cross-origin headers and trace events wrap every dispatch.

use std::collections::HashMap;
use std::str::Utf8Error;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use matchit::Router as MatchitRouter;
use percent_encoding::percent_decode_str;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::{cors, trace};
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Each [`Router::on`] call returns `self` so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use bistro::{Method, Request, Response, Router};
    /// # async fn list_dishes(_: Request) -> Response { Response::text("") }
    /// # async fn dish_by_id(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::Get, "/dishes",              list_dishes)
    ///     .on(Method::Get, "/dishes/details/{id}", dish_by_id);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is malformed or conflicts with an existing route.
    /// Routes are fixed at startup, so this is a programming error.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.add(method, path, handler)
    }

    fn add(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Finds the handler for `method` + `path`, with the raw (still
    /// percent-encoded) path parameters.
    ///
    /// A single trailing slash is ignored, so `/dishes/` reaches `/dishes`.
    /// `HEAD` falls back to the `GET` route when no explicit `HEAD` route
    /// exists. Matching is case-sensitive.
    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler, Vec<(String, String)>)> {
        let trimmed = path.strip_suffix('/').filter(|p| !p.is_empty());
        let matched = self.find(method, path)
            .or_else(|| trimmed.and_then(|p| self.find(method, p)))?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    fn find<'r, 'p>(
        &'r self,
        method: Method,
        path: &'p str,
    ) -> Option<matchit::Match<'r, 'p, &'r BoxedHandler>> {
        let hit = self.routes.get(&method).and_then(|tree| tree.at(path).ok());
        match hit {
            None if method == Method::Head => self.routes.get(&Method::Get)?.at(path).ok(),
            hit => hit,
        }
    }

    /// Routes one request and produces one response. Never fails: every
    /// outcome is expressed as a status code.
    pub(crate) async fn dispatch(&self, parts: http::request::Parts, body: Bytes) -> Response {
        let started = Instant::now();
        let response = cors::allow_origin(self.route(&parts, body).await);
        trace::record(&parts.method, parts.uri.path(), &response, started.elapsed());
        response
    }

    async fn route(&self, parts: &http::request::Parts, body: Bytes) -> Response {
        let Ok(method) = Method::try_from(&parts.method) else {
            return Response::status(Status::MethodNotAllowed);
        };
        if method == Method::Options {
            return cors::preflight(&parts.headers);
        }
        let Some((handler, raw)) = self.lookup(method, parts.uri.path()) else {
            return Response::status(Status::NotFound);
        };
        let Ok(params) = decode_params(raw) else {
            return Response::status(Status::BadRequest);
        };
        handler.call(Request::new(&parts.uri, &parts.headers, body, params)).await
    }
}

/// Percent-decodes path parameters. Fails if a decoded value is not UTF-8.
fn decode_params(raw: Vec<(String, String)>) -> Result<HashMap<String, String>, Utf8Error> {
    raw.into_iter()
        .map(|(k, v)| Ok((k, percent_decode_str(&v).decode_utf8()?.into_owned())))
        .collect()
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn echo_id(req: Request) -> Response {
        Response::text(req.param("id").unwrap_or("none").to_owned())
    }

    fn parts(method: &str, uri: &str) -> http::request::Parts {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    fn router() -> Router {
        Router::new().on(Method::Get, "/restaurants/cuisine/{id}", echo_id)
    }

    #[tokio::test]
    async fn path_params_are_percent_decoded() {
        let res = router().dispatch(parts("GET", "/restaurants/cuisine/South%20Indian"), Bytes::new()).await;
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.body(), b"South Indian");
    }

    #[tokio::test]
    async fn unknown_path_is_not_found_with_cors() {
        let res = router().dispatch(parts("GET", "/menus"), Bytes::new()).await;
        assert_eq!(res.status_code(), 404);
        assert!(res.body().is_empty());
        assert_eq!(res.header("access-control-allow-origin"), Some("*"));
    }

    #[tokio::test]
    async fn unregistered_method_is_not_found() {
        let res = router().dispatch(parts("POST", "/restaurants/cuisine/Thai"), Bytes::new()).await;
        assert_eq!(res.status_code(), 404);
    }

    #[tokio::test]
    async fn non_standard_method_is_rejected() {
        let res = router().dispatch(parts("PURGE", "/restaurants/cuisine/Thai"), Bytes::new()).await;
        assert_eq!(res.status_code(), 405);
    }

    #[tokio::test]
    async fn head_falls_back_to_get() {
        let res = router().dispatch(parts("HEAD", "/restaurants/cuisine/Thai"), Bytes::new()).await;
        assert_eq!(res.status_code(), 200);
    }

    #[tokio::test]
    async fn options_is_answered_as_preflight() {
        let res = router().dispatch(parts("OPTIONS", "/anything"), Bytes::new()).await;
        assert_eq!(res.status_code(), 204);
        assert!(res.header("access-control-allow-methods").is_some());
    }

    #[tokio::test]
    async fn trailing_slash_reaches_the_same_route() {
        let app = router().on(Method::Get, "/restaurants", |_req: Request| async { Response::text("all") });
        let res = app.dispatch(parts("GET", "/restaurants/"), Bytes::new()).await;
        assert_eq!((res.status_code(), res.body()), (200, &b"all"[..]));

        let res = app.dispatch(parts("GET", "/restaurants/cuisine/Thai/"), Bytes::new()).await;
        assert_eq!((res.status_code(), res.body()), (200, &b"Thai"[..]));

        let res = app.dispatch(parts("HEAD", "/restaurants/"), Bytes::new()).await;
        assert_eq!(res.status_code(), 200);
    }

    #[tokio::test]
    async fn trailing_slash_keeps_path_params() {
        let app = Router::new().on(Method::Get, "/dishes/details/{id}", echo_id);
        let res = app.dispatch(parts("GET", "/dishes/details/1/"), Bytes::new()).await;
        assert_eq!((res.status_code(), res.body()), (200, &b"1"[..]));

        let res = app.dispatch(parts("GET", "/"), Bytes::new()).await;
        assert_eq!(res.status_code(), 404);
    }

    #[tokio::test]
    async fn only_one_trailing_slash_is_ignored() {
        let res = router().dispatch(parts("GET", "/restaurants/cuisine/Thai//"), Bytes::new()).await;
        assert_eq!(res.status_code(), 404);
    }

    #[tokio::test]
    async fn matching_is_case_sensitive() {
        let res = router().dispatch(parts("GET", "/Restaurants/cuisine/Thai"), Bytes::new()).await;
        assert_eq!(res.status_code(), 404);
    }

    #[tokio::test]
    async fn malformed_percent_encoding_is_bad_request() {
        let res = router().dispatch(parts("GET", "/restaurants/cuisine/%E0"), Bytes::new()).await;
        assert_eq!(res.status_code(), 400);
        assert_eq!(res.header("access-control-allow-origin"), Some("*"));
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_route_panics() {
        let _ = router().on(Method::Get, "/restaurants/cuisine/{name}", echo_id);
    }
}
