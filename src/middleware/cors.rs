//! Permissive cross-origin resource sharing.
//!
//! Any origin may read any response. Preflight requests (`OPTIONS`) are
//! answered directly and never reach a handler.

use crate::response::Response;
use crate::status::Status;

const ALLOW_ORIGIN: &str = "access-control-allow-origin";
const ALLOW_METHODS: &str = "access-control-allow-methods";
const ALLOW_HEADERS: &str = "access-control-allow-headers";
const REQUEST_HEADERS: &str = "access-control-request-headers";

const ALLOWED_METHODS: &str = "GET,HEAD,PUT,PATCH,POST,DELETE";

/// Adds `access-control-allow-origin: *` to a response.
pub fn allow_origin(mut response: Response) -> Response {
    response.set_header(ALLOW_ORIGIN, "*");
    response
}

/// Answers a preflight request with `204 No Content`.
///
/// The headers the client asks to send are reflected back as allowed.
pub fn preflight(headers: &http::HeaderMap) -> Response {
    let mut response = Response::builder()
        .status(Status::NoContent)
        .header(ALLOW_METHODS, ALLOWED_METHODS)
        .no_body();
    if let Some(requested) = headers.get(REQUEST_HEADERS).and_then(|v| v.to_str().ok()) {
        response.set_header(ALLOW_HEADERS, requested);
        response.set_header("vary", "Access-Control-Request-Headers");
    }
    response
}
