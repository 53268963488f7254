//! Checkout request DTOs
//!
//! The shapes the storefront submits to `POST /api/orders`. Structural and
//! menu-content rules are enforced server-side by the composition
//! validator; `validator` derives cover field formats only.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One side choice inside a completa
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SideSelection {
    pub menu_item_id: i64,
    pub quantity: i32,
}

/// A meal bundle: exactly one entree plus three side units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletaSelection {
    pub entree_id: i64,
    pub sides: Vec<SideSelection>,
}

/// An entree or side ordered outside a completa, priced individually
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraSelection {
    pub menu_item_id: i64,
    pub quantity: i32,
}

/// Selections for one day slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDaySelection {
    /// 1..5 = Monday..Friday
    pub day_of_week: i64,
    pub completas: Vec<CompletaSelection>,
    #[serde(default)]
    pub extra_entrees: Vec<ExtraSelection>,
    #[serde(default)]
    pub extra_sides: Vec<ExtraSelection>,
}

/// Contact details required for an unauthenticated checkout
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GuestInfo {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(min = 1, max = 50))]
    pub phone: String,
}

/// Delivery address supplied inline by a guest (no saved addresses yet)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GuestAddress {
    #[validate(length(min = 1, max = 200))]
    pub line1: String,
    pub line2: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 20))]
    pub postal_code: String,
    pub delivery_notes: Option<String>,
}

/// `POST /api/orders` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub weekly_menu_id: i64,
    pub days: Vec<OrderDaySelection>,
    pub is_pickup: bool,
    /// Saved address of an authenticated customer (delivery only)
    pub address_id: Option<i64>,
    /// Inline address for guest delivery orders
    pub guest_address: Option<GuestAddress>,
    /// Required when no authenticated customer identity is present
    pub guest_info: Option<GuestInfo>,
    /// Idempotency key: one order per (customer, menu, session)
    pub checkout_session_id: String,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

/// `PUT /api/orders/{id}/fulfillment` body — pickup/delivery toggle during
/// checkout; updates the same order row, last writer wins
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateFulfillmentRequest {
    pub is_pickup: bool,
    pub address_id: Option<i64>,
    pub guest_address: Option<GuestAddress>,
}

/// `PUT /api/orders/{id}/days` body — replaces the day/item subtree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceDaysRequest {
    pub days: Vec<OrderDaySelection>,
}
