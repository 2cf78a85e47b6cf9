//! REST API over the allocation engine and bill store.
//!
//! - `GET /health`
//! - `POST /calculate`: allocate without saving
//! - `GET /bills?owner=`, `POST /bills`, `DELETE /bills/{id}`
//! - `GET /properties?owner=`, `POST /properties`,
//!   `PUT /properties/{id}/rooms`, `DELETE /properties/{id}`

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};

use crate::store::BillStore;

pub use types::{CalculateRequest, ErrorResponse, NewPropertyRequest, SaveBillRequest};

/// Application state shared across all request handlers.
///
/// The store synchronizes internally, so the state itself needs no lock.
pub struct AppState {
    /// Backing store for saved bills and property templates.
    pub store: Arc<dyn BillStore>,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/calculate", post(handlers::calculate))
        .route("/bills", get(handlers::list_bills).post(handlers::save_bill))
        .route("/bills/{id}", delete(handlers::delete_bill))
        .route(
            "/properties",
            get(handlers::list_properties).post(handlers::create_property),
        )
        .route("/properties/{id}", delete(handlers::delete_property))
        .route("/properties/{id}/rooms", put(handlers::replace_rooms))
        .with_state(state)
}

/// Binds to the given address and serves the API until the process exits.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
