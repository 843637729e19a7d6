use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bistro::store::{SharedStore, Store};
use bistro::{api, Config, Error, Server};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();

    // The store is opened before the listener binds; a failure here is fatal.
    let store = Store::open(&config.store()).inspect_err(|e| {
        error!(path = %config.database.display(), error = %e, "error opening database");
    })?;
    info!(path = %config.database.display(), "database connected");

    let app = api::routes(SharedStore::ready(store));

    Server::bind(config.addr)
        .await
        .inspect_err(|e| error!(addr = %config.addr, error = %e, "bind failed"))?
        .serve(app)
        .await
}
