//! Order API module
//!
//! Checkout (create), lookups, admin lifecycle operations, and the
//! payment/refund surface.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/by-number/{number}", get(handler::get_by_number))
        .route("/guest/{token}", get(handler::get_by_guest_token))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/status", put(handler::update_status))
        .route("/{id}/days", put(handler::replace_days))
        .route("/{id}/fulfillment", put(handler::update_fulfillment))
        .route("/{id}/pay", post(handler::pay))
        .route("/{id}/credit-account", post(handler::mark_credit_account))
        .route("/{id}/refunds", post(handler::refund))
        .route("/{id}/payments", get(handler::get_payments))
}
