//! Address Repository

use super::{RepoError, RepoResult};
use shared::checkout::GuestAddress;
use shared::models::Address;
use sqlx::SqlitePool;

/// Find an address only if it belongs to the given customer
pub async fn find_owned(
    pool: &SqlitePool,
    address_id: i64,
    customer_id: i64,
) -> RepoResult<Option<Address>> {
    let row =
        sqlx::query_as::<_, Address>("SELECT * FROM address WHERE id = ? AND customer_id = ?")
            .bind(address_id)
            .bind(customer_id)
            .fetch_optional(pool)
            .await?;
    Ok(row)
}

/// Create an address for a customer (guest checkout supplies it inline)
pub async fn create(
    pool: &SqlitePool,
    customer_id: i64,
    data: &GuestAddress,
) -> RepoResult<Address> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO address (id, customer_id, line1, line2, city, postal_code, delivery_notes, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )
    .bind(id)
    .bind(customer_id)
    .bind(&data.line1)
    .bind(&data.line2)
    .bind(&data.city)
    .bind(&data.postal_code)
    .bind(&data.delivery_notes)
    .bind(now)
    .execute(pool)
    .await?;

    let row = sqlx::query_as::<_, Address>("SELECT * FROM address WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.ok_or_else(|| RepoError::Database("Failed to create address".into()))
}
