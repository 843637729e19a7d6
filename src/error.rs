//! Unified infrastructure error type.

use thiserror::Error;

use crate::store::StoreError;

/// The error type returned by bistro's fallible startup operations.
///
/// Query-level outcomes (404, 500 for a failed statement) are expressed as
/// HTTP [`Response`](crate::Response) values, not as `Error`s. This type
/// surfaces infrastructure failures: opening the database, binding to a port
/// or accepting a connection. Any of them ends the process.
#[derive(Debug, Error)]
pub enum Error {
    /// Socket bind or accept failure.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    /// The database could not be opened at startup.
    #[error("store: {0}")]
    Store(#[from] StoreError),
}
