//! Order aggregate models

use serde::{Deserialize, Serialize};

/// Fulfillment status of an order
///
/// `PENDING → CONFIRMED → DELIVERED`, with `CANCELLED` reachable from
/// `PENDING` or `CONFIRMED`. `DELIVERED` and `CANCELLED` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Terminal states admit no further status or item edits
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

/// Cached payment state of an order
///
/// Derived from the payment ledger; the ledger is the source of truth and
/// this field is recomputed wholesale on every ledger append.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
    /// House-account customers, never charged through the processor
    CreditAccount,
}

/// Order aggregate root
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    /// Human-readable reference, `LL-<year>-<6 digits>`
    pub order_number: String,
    pub customer_id: i64,
    pub weekly_menu_id: i64,
    pub is_pickup: bool,
    /// NULL iff pickup
    pub address_id: Option<i64>,
    /// Server-side idempotency key: one order per
    /// (customer, weekly menu, checkout session)
    pub checkout_session_id: String,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    /// Single-use lookup capability for guest orders; NULL when the
    /// order was placed by an authenticated customer
    pub guest_token: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// One day slot within an order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderDay {
    pub id: i64,
    pub order_id: i64,
    /// 1..5 = Monday..Friday, unique per order
    pub day_of_week: i64,
}

/// Priced line item within an order day
///
/// Items sharing a non-null `completa_group_id` within one day together
/// form exactly one bundle: the entree carries the full bundle price and
/// its sides are priced at zero, so editing a completa's side mix never
/// changes its charged price. Extras (`is_completa = false`) are priced
/// per unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_day_id: i64,
    pub menu_item_id: i64,
    pub quantity: i32,
    /// Price snapshot at creation, never looked up later
    pub unit_price: f64,
    pub is_completa: bool,
    pub completa_group_id: Option<String>,
}

/// Order with its day/item subtree (API read model)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub days: Vec<OrderDayDetail>,
}

/// One day slot with its items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDayDetail {
    pub day_of_week: i64,
    pub items: Vec<OrderItem>,
}
