//! Delivery address model

use serde::{Deserialize, Serialize};

/// Delivery address owned by a customer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Address {
    pub id: i64,
    pub customer_id: i64,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub delivery_notes: Option<String>,
    pub created_at: i64,
}
