//! # bistro
//!
//! A read-only JSON API over a two-table SQLite database of restaurants and
//! the dishes they serve.
//!
//! Every endpoint runs exactly one parameterized statement and shapes the
//! result: `200 {"restaurants": ..}` / `200 {"dishes": ..}` when rows come
//! back, `404 {"message": ..}` when none do, `500 {"error": ..}` when the
//! statement fails. See [`api`] for the route table.
//!
//! ## Layout
//!
//! - HTTP plumbing: [`Router`] (radix tree via [`matchit`]), [`Server`]
//!   (hyper, graceful shutdown), [`Request`], [`Response`], [`Status`]
//! - [`store`]: the read-only SQLite handle and the startup slot it lives in
//! - [`catalog`]: the fixed statements
//! - [`api`]: handlers and routes
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use bistro::store::{SharedStore, Store, StoreConfig};
//! use bistro::{api, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), bistro::Error> {
//!     let store = Store::open(&StoreConfig::new("database.sqlite"))?;
//!     let app = api::routes(SharedStore::ready(store));
//!     Server::bind("0.0.0.0:3000".parse().unwrap()).await?.serve(app).await
//! }
//! ```

mod error;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod api;
pub mod catalog;
pub mod config;
pub mod handler;
pub mod health;
pub mod middleware;
pub mod store;

pub use config::Config;
pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Response};
pub use router::Router;
pub use server::Server;
pub use status::Status;
