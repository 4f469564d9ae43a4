//! Spendtrack is a REST API server for tracking personal expenses.
//!
//! Expenses belong to user-defined categories and can be listed with
//! filtering, sorting and pagination, or rolled up into aggregate analytics
//! (totals, per-category breakdown, daily trend, top expenses).
//!
//! Monetary amounts are handled as arbitrary-precision decimals from the
//! database to the JSON boundary so that sums over many records match
//! hand-computed totals to the cent.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

pub mod analytics;
pub mod db;
mod endpoints;
mod error;
pub mod models;
pub mod pagination;
mod routes;
mod state;
pub mod stores;

pub use error::{Error, FieldError};
pub use routes::build_router;
pub use state::{AppState, CategoryState, ExpenseState};

/// Wait for ctrl+c or, on Unix, the terminate signal, then ask the server
/// behind `handle` to drain its connections and stop.
///
/// Run this as a task alongside the server.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to listen for the ctrl+c signal");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for the terminate signal")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::debug!("received ctrl+c, shutting down"),
        _ = terminate => tracing::debug!("received terminate signal, shutting down"),
    }

    handle.graceful_shutdown(Some(Duration::from_secs(1)));
}
