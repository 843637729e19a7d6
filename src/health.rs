//! Liveness and readiness probes.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Is the database installed and answering? Failure → no traffic. |

use tracing::warn;

use crate::request::Request;
use crate::response::Response;
use crate::status::Status;
use crate::store::SharedStore;

/// Always `200 OK` with body `"ok"`. If the process can answer HTTP at all,
/// it is alive.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// `200 OK` with body `"ready"` once the store is installed and answers a
/// trivial statement; `503 Service Unavailable` otherwise.
pub async fn readiness(db: SharedStore, _req: Request) -> Response {
    let Ok(store) = db.get() else {
        return Response::status(Status::ServiceUnavailable);
    };
    match store.ping().await {
        Ok(()) => Response::text("ready"),
        Err(e) => {
            warn!(error = %e, "readiness check failed");
            Response::status(Status::ServiceUnavailable)
        }
    }
}
