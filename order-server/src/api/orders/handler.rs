//! Order API Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::api::auth::AuthCustomer;
use crate::checkout;
use crate::core::ServerState;
use crate::db::repository::order;
use crate::utils::{AppError, AppResponse, AppResult, ok};
use shared::checkout::{CreateOrderRequest, ReplaceDaysRequest, UpdateFulfillmentRequest};
use shared::models::{Order, OrderDetail, OrderStatus, Payment};

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i32,
    #[serde(default)]
    pub offset: i32,
}

fn default_limit() -> i32 {
    50
}

/// List orders for the admin table (paginated)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<AppResponse<Vec<Order>>>> {
    let orders = order::find_all(&state.db, query.limit.clamp(1, 200), query.offset.max(0)).await?;
    Ok(ok(orders))
}

/// Checkout: create an order
///
/// Validation failures map to 400, identity collisions to 409, and a
/// missing identity (no session, no guest info) to 401. Repeat submissions
/// for the same checkout session return the already-created order.
pub async fn create(
    State(state): State<ServerState>,
    AuthCustomer(customer_id): AuthCustomer,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<AppResponse<OrderDetail>>> {
    let detail = state.checkout().create_order(customer_id, payload).await?;
    Ok(ok(detail))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<OrderDetail>>> {
    let found = order::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {id} not found")))?;
    Ok(ok(order::load_detail(&state.db, found).await?))
}

pub async fn get_by_number(
    State(state): State<ServerState>,
    Path(number): Path<String>,
) -> AppResult<Json<AppResponse<OrderDetail>>> {
    let found = order::find_by_number(&state.db, &number)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {number} not found")))?;
    Ok(ok(order::load_detail(&state.db, found).await?))
}

/// Guest order lookup via the single-use capability token
pub async fn get_by_guest_token(
    State(state): State<ServerState>,
    Path(token): Path<String>,
) -> AppResult<Json<AppResponse<OrderDetail>>> {
    Ok(ok(checkout::find_guest_order(&state.db, &token).await?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Admin status transition (PENDING → CONFIRMED → DELIVERED, CANCELLED)
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let updated = state.lifecycle().set_status(id, payload.status).await?;
    Ok(ok(updated))
}

/// Replace the day/item subtree of an unfulfilled order (admin edit)
pub async fn replace_days(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ReplaceDaysRequest>,
) -> AppResult<Json<AppResponse<OrderDetail>>> {
    let detail = state.checkout().replace_days(id, payload.days).await?;
    Ok(ok(detail))
}

/// Pickup/delivery toggle during checkout
pub async fn update_fulfillment(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateFulfillmentRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let updated = state.checkout().update_fulfillment(id, payload).await?;
    Ok(ok(updated))
}

#[derive(Debug, Deserialize)]
pub struct PayRequest {
    pub method: Option<String>,
}

/// Processor-driven payment confirmation; an empty body `{}` falls back
/// to the method stored on the order
pub async fn pay(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PayRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let (updated, _entry) = state.lifecycle().confirm_payment(id, payload.method).await?;
    Ok(ok(updated))
}

/// House-account order: never charged through the processor
pub async fn mark_credit_account(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<Order>>> {
    let updated = state.lifecycle().mark_credit_account(id).await?;
    Ok(ok(updated))
}

#[derive(Debug, Deserialize)]
pub struct RefundBody {
    pub amount: f64,
    pub notes: Option<String>,
}

/// Refund response: updated order plus the appended ledger entry
#[derive(Debug, serde::Serialize)]
pub struct RefundResponse {
    pub order: Order,
    pub entry: Payment,
}

/// Issue a refund against a paid order
pub async fn refund(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<RefundBody>,
) -> AppResult<Json<AppResponse<RefundResponse>>> {
    let (updated, entry) = state
        .lifecycle()
        .refund(id, payload.amount, payload.notes)
        .await?;
    Ok(ok(RefundResponse {
        order: updated,
        entry,
    }))
}

/// Payment ledger for an order, oldest first
pub async fn get_payments(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<Vec<Payment>>>> {
    Ok(ok(checkout::order_ledger(&state.db, id).await?))
}
