//! Middleware layer.
//!
//! Cross-cutting concerns applied by the router around every handler call:
//!
//! - [`cors`] — permissive cross-origin headers and preflight answers
//! - [`trace`] — one structured event per request with method, path, status, latency

pub mod cors;
pub mod trace;
