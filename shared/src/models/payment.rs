//! Payment ledger model
//!
//! One row per money movement on an order: positive amounts are charges,
//! negative amounts are refunds. Rows are immutable once written; refunds
//! append new negative rows rather than editing prior ones.

use serde::{Deserialize, Serialize};

/// Outcome recorded for a ledger entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum LedgerEntryStatus {
    /// Confirmed charge
    Completed,
    /// Confirmed refund
    Refunded,
    /// Rejected by the processor
    Failed,
}

/// Append-only payment ledger row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    /// Positive = charge, negative = refund
    pub amount: f64,
    pub method: String,
    pub status: LedgerEntryStatus,
    /// Processor transaction id
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
}
