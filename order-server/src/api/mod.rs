//! HTTP API
//!
//! Resource routers nested under `/api`, one module per resource with its
//! handlers alongside.

pub mod auth;
pub mod health;
pub mod menus;
pub mod orders;
pub mod pricing_config;

use axum::Router;

use crate::core::ServerState;

pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(menus::router())
        .merge(pricing_config::router())
        .merge(orders::router())
        .with_state(state)
}
