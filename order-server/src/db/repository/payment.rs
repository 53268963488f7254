//! Payment Repository
//!
//! Append-only ledger: one row per money movement on an order. Rows are
//! never updated or deleted; refunds append new negative rows. The order's
//! cached payment_status is derived from this table.

use super::{RepoError, RepoResult};
use shared::models::{LedgerEntryStatus, Payment};
use sqlx::SqlitePool;

/// Fields for a new ledger entry
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub order_id: i64,
    /// Positive = charge, negative = refund
    pub amount: f64,
    pub method: String,
    pub status: LedgerEntryStatus,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

/// Append a ledger entry
pub async fn append(pool: &SqlitePool, entry: NewLedgerEntry) -> RepoResult<Payment> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO payment (id, order_id, amount, method, status, reference, notes, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )
    .bind(id)
    .bind(entry.order_id)
    .bind(entry.amount)
    .bind(&entry.method)
    .bind(entry.status)
    .bind(&entry.reference)
    .bind(&entry.notes)
    .bind(now)
    .execute(pool)
    .await?;

    let row = sqlx::query_as::<_, Payment>("SELECT * FROM payment WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.ok_or_else(|| RepoError::Database("Failed to append payment ledger entry".into()))
}

/// Ledger for one order, oldest first
pub async fn list_by_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<Payment>> {
    let rows = sqlx::query_as::<_, Payment>(
        "SELECT * FROM payment WHERE order_id = ? ORDER BY created_at ASC, id ASC",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
