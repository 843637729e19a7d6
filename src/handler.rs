//! Handler trait and type erasure.
//!
//! The router stores handlers of different concrete types in one table, so
//! each one is wrapped in [`FnHandler`] and kept behind `Arc<dyn ErasedHandler>`:
//!
//! ```text
//! async fn list_dishes(db, req) -> Result<Response, ApiError>
//!        ↓ handler::with_state(db, list_dishes)
//! move |req| list_dishes(db.clone(), req)          ← Handler blanket impl
//!        ↓ into_boxed_handler()
//! Arc::new(FnHandler(closure))                     ← BoxedHandler
//!        ↓ handler.call(req)  at request time
//! Box::pin(async { fut.await.into_response() })    ← BoxFuture
//! ```
//!
//! Per request this costs one `Arc` clone and one virtual call.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
#[doc(hidden)]
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// Satisfied automatically by any function or closure of the shape
///
/// ```text
/// Fn(Request) -> impl Future<Output = impl IntoResponse>
/// ```
///
/// Sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Binds shared state to a two-argument handler.
///
/// The state is cloned once per request, so it should be a cheap handle
/// (an `Arc` or a type wrapping one).
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use bistro::{handler, Method, Request, Response, Router};
/// async fn greet(name: Arc<str>, _req: Request) -> Response {
///     Response::text(format!("hello {name}"))
/// }
///
/// Router::new().on(Method::Get, "/", handler::with_state(Arc::from("bistro"), greet));
/// ```
pub fn with_state<S, F, Fut, R>(state: S, f: F) -> impl Handler
where
    S: Clone + Send + Sync + 'static,
    F: Fn(S, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    move |req: Request| f(state.clone(), req)
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Bridges a concrete handler `F` to [`ErasedHandler`].
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}
