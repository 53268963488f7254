//! Weekly menu API module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/menus", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/current", get(handler::current))
        .route("/{id}", get(handler::get_by_id))
}
