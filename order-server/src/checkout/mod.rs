//! Checkout engine
//!
//! Orchestrates order creation: guest identity resolution, composition
//! validation against the published menu, completa grouping, pricing, and
//! the atomic persist. All later status/payment changes belong to the
//! lifecycle manager.

pub mod composition;
pub mod error;
pub mod grouping;
pub mod guard;
pub mod identity;
pub mod pricing;

pub use composition::{MenuIndex, validate_composition};
pub use error::CompositionError;
pub use guard::{CheckoutGuard, SubmitOutcome};

use crate::db::repository::{address, menu, order, payment, pricing_config};
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::checkout::{CreateOrderRequest, OrderDaySelection, UpdateFulfillmentRequest};
use shared::models::{Order, OrderDetail, PaymentStatus};
use sqlx::SqlitePool;
use validator::Validate;

/// Checkout orchestration service
#[derive(Clone)]
pub struct CheckoutService {
    pool: SqlitePool,
}

impl CheckoutService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an order from a checkout submission.
    ///
    /// Identity resolution runs first (validation needs a customer id for
    /// address ownership). The checkout-session key makes the create
    /// idempotent: a repeat submission for the same session returns the
    /// order that already exists instead of inserting a duplicate.
    pub async fn create_order(
        &self,
        authenticated: Option<i64>,
        req: CreateOrderRequest,
    ) -> AppResult<OrderDetail> {
        validate_required_text(&req.checkout_session_id, "checkout_session_id", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&req.notes, "notes", MAX_NOTE_LEN)?;
        validate_optional_text(&req.payment_method, "payment_method", MAX_SHORT_TEXT_LEN)?;

        let identity =
            identity::resolve(&self.pool, authenticated, req.guest_info.as_ref()).await?;

        if let Some(existing) = order::find_by_checkout_session(
            &self.pool,
            identity.customer_id,
            req.weekly_menu_id,
            &req.checkout_session_id,
        )
        .await?
        {
            tracing::info!(
                order_id = existing.id,
                checkout_session_id = %req.checkout_session_id,
                "Checkout session already created an order, returning it"
            );
            return Ok(order::load_detail(&self.pool, existing).await?);
        }

        let index = self.load_menu_index(req.weekly_menu_id).await?;

        let address_id = if req.is_pickup {
            // Pickup stores no address even when one was supplied
            None
        } else {
            self.resolve_address(identity.customer_id, req.address_id, req.guest_address.as_ref())
                .await?
        };

        validate_composition(&index, &req.days, req.is_pickup, address_id.is_some())
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let config = pricing_config::get(&self.pool)
            .await?
            .ok_or_else(|| AppError::Config("Pricing config is not set".to_string()))?;

        let totals = pricing::price_order(&req.days, &config, req.is_pickup);
        let drafts = grouping::assign_line_items(&req.days, &config);

        let new = order::NewOrder {
            customer_id: identity.customer_id,
            weekly_menu_id: req.weekly_menu_id,
            is_pickup: req.is_pickup,
            address_id,
            checkout_session_id: req.checkout_session_id.clone(),
            subtotal: totals.subtotal,
            delivery_fee: totals.delivery_fee,
            total_amount: totals.total_amount,
            payment_method: req.payment_method.clone(),
            notes: req.notes.clone(),
            guest_token: identity.is_guest.then(shared::util::guest_token),
        };

        let created = match order::create(&self.pool, new, &drafts).await {
            Ok(order) => {
                tracing::info!(
                    order_id = order.id,
                    order_number = %order.order_number,
                    total = order.total_amount,
                    "Order created"
                );
                order
            }
            // Lost the insert race for the same checkout session; the
            // winner's order is the right answer
            Err(e) if e.is_duplicate() => order::find_by_checkout_session(
                &self.pool,
                identity.customer_id,
                req.weekly_menu_id,
                &req.checkout_session_id,
            )
            .await?
            .ok_or_else(|| AppError::Database("Duplicate create without an existing order".into()))?,
            Err(e) => return Err(e.into()),
        };

        Ok(order::load_detail(&self.pool, created).await?)
    }

    /// Replace the day/item subtree of an unfulfilled order (admin edit).
    ///
    /// The new selections are re-validated against the order's menu and
    /// re-priced against the current config; the subtree is swapped in one
    /// transaction, never patched item by item.
    pub async fn replace_days(
        &self,
        order_id: i64,
        days: Vec<OrderDaySelection>,
    ) -> AppResult<OrderDetail> {
        let existing = order::find_by_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {order_id} not found")))?;

        if existing.status.is_terminal() {
            return Err(AppError::BusinessRule(format!(
                "Order {} can no longer be edited (status {:?})",
                existing.order_number, existing.status
            )));
        }

        let index = self.load_menu_index(existing.weekly_menu_id).await?;
        validate_composition(
            &index,
            &days,
            existing.is_pickup,
            existing.address_id.is_some(),
        )
        .map_err(|e| AppError::Validation(e.to_string()))?;

        let config = pricing_config::get(&self.pool)
            .await?
            .ok_or_else(|| AppError::Config("Pricing config is not set".to_string()))?;
        let totals = pricing::price_order(&days, &config, existing.is_pickup);
        let drafts = grouping::assign_line_items(&days, &config);

        let updated = order::replace_days(
            &self.pool,
            order_id,
            &drafts,
            totals.subtotal,
            totals.delivery_fee,
            totals.total_amount,
        )
        .await?;
        Ok(order::load_detail(&self.pool, updated).await?)
    }

    /// Toggle pickup/delivery (or change address) during checkout.
    ///
    /// Updates the same order row, last writer wins. Only the delivery fee
    /// changes; the item subtree and subtotal are untouched.
    pub async fn update_fulfillment(
        &self,
        order_id: i64,
        req: UpdateFulfillmentRequest,
    ) -> AppResult<Order> {
        let existing = order::find_by_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {order_id} not found")))?;

        if existing.status.is_terminal() {
            return Err(AppError::BusinessRule(format!(
                "Order {} can no longer be edited (status {:?})",
                existing.order_number, existing.status
            )));
        }
        if existing.payment_status != PaymentStatus::Pending {
            return Err(AppError::BusinessRule(
                "Fulfillment cannot change after payment".to_string(),
            ));
        }

        let address_id = if req.is_pickup {
            None
        } else {
            let resolved = self
                .resolve_address(existing.customer_id, req.address_id, req.guest_address.as_ref())
                .await?;
            match resolved {
                Some(id) => Some(id),
                None => {
                    return Err(AppError::Validation(
                        CompositionError::MissingDeliveryAddress.to_string(),
                    ));
                }
            }
        };

        let config = pricing_config::get(&self.pool)
            .await?
            .ok_or_else(|| AppError::Config("Pricing config is not set".to_string()))?;
        let meals = order::meal_count(&self.pool, order_id).await?;
        let delivery_fee = pricing::delivery_fee_for(meals, &config, req.is_pickup);
        let total_amount =
            pricing::to_f64(pricing::to_decimal(existing.subtotal) + pricing::to_decimal(delivery_fee));

        let updated = order::update_fulfillment(
            &self.pool,
            order_id,
            req.is_pickup,
            address_id,
            delivery_fee,
            total_amount,
        )
        .await?;
        Ok(updated)
    }

    async fn load_menu_index(&self, weekly_menu_id: i64) -> AppResult<MenuIndex> {
        let weekly_menu = menu::find_weekly_menu(&self.pool, weekly_menu_id)
            .await?
            .ok_or_else(|| AppError::Config(format!("Weekly menu {weekly_menu_id} not found")))?;
        if !weekly_menu.is_published {
            return Err(AppError::Config(format!(
                "Weekly menu {weekly_menu_id} is not published"
            )));
        }

        let items = menu::list_week_items(&self.pool, weekly_menu_id).await?;
        let associations = menu::list_week_associations(&self.pool, weekly_menu_id).await?;
        let staples = menu::list_staple_items(&self.pool).await?;
        Ok(MenuIndex::build(&items, &associations, &staples))
    }

    async fn resolve_address(
        &self,
        customer_id: i64,
        address_id: Option<i64>,
        guest_address: Option<&shared::checkout::GuestAddress>,
    ) -> AppResult<Option<i64>> {
        if let Some(id) = address_id {
            return match address::find_owned(&self.pool, id, customer_id).await? {
                Some(found) => Ok(Some(found.id)),
                None => Err(AppError::Validation(
                    "The selected delivery address does not belong to this customer".to_string(),
                )),
            };
        }
        if let Some(data) = guest_address {
            data.validate()
                .map_err(|e| AppError::Validation(format!("Invalid delivery address: {e}")))?;
            let created = address::create(&self.pool, customer_id, data).await?;
            return Ok(Some(created.id));
        }
        // The composition validator raises the user-facing missing-address
        // reason for delivery orders
        Ok(None)
    }
}

/// Look up the payment ledger for an order (read model)
pub async fn order_ledger(
    pool: &SqlitePool,
    order_id: i64,
) -> AppResult<Vec<shared::models::Payment>> {
    order::find_by_id(pool, order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {order_id} not found")))?;
    Ok(payment::list_by_order(pool, order_id).await?)
}

/// Guest order lookup by single-use token
pub async fn find_guest_order(pool: &SqlitePool, token: &str) -> AppResult<OrderDetail> {
    let found = order::find_by_guest_token(pool, token)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
    Ok(order::load_detail(pool, found).await?)
}
