// --- File: crates/bookline_booking/src/routes.rs ---

use crate::handlers::{
    book_handler, health_handler, rpc_handler, sse_discovery_handler, BookingState,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Creates a router containing all routes for the booking feature.
pub fn routes(state: Arc<BookingState>) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/book", post(book_handler))
        .route("/mcp", post(rpc_handler))
        .route("/sse", get(sse_discovery_handler))
        .with_state(state)
}
