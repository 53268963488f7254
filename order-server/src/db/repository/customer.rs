//! Customer Repository
//!
//! Durable customer identities, including shadow identities created on
//! behalf of guest checkouts (password_hash IS NULL).

use super::{RepoError, RepoResult};
use shared::models::Customer;
use sqlx::SqlitePool;

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Customer>> {
    let row = sqlx::query_as::<_, Customer>("SELECT * FROM customer WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Lookup by normalized email (caller normalizes)
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<Customer>> {
    let row = sqlx::query_as::<_, Customer>("SELECT * FROM customer WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Create a shadow identity for a guest checkout (no credentials)
pub async fn create_shadow(
    pool: &SqlitePool,
    email: &str,
    first_name: &str,
    last_name: &str,
    phone: &str,
) -> RepoResult<Customer> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO customer (id, email, first_name, last_name, phone, password_hash, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, ?6)",
    )
    .bind(id)
    .bind(email)
    .bind(first_name)
    .bind(last_name)
    .bind(phone)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create shadow customer".into()))
}

/// Refresh the contact fields of a shadow identity
///
/// Shadow identities have no authenticated owner to contest the change, so
/// they accumulate the most recent contact info supplied at checkout.
pub async fn refresh_shadow_contact(
    pool: &SqlitePool,
    id: i64,
    first_name: &str,
    last_name: &str,
    phone: &str,
) -> RepoResult<Customer> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE customer SET first_name = ?1, last_name = ?2, phone = ?3, updated_at = ?4 \
         WHERE id = ?5 AND password_hash IS NULL",
    )
    .bind(first_name)
    .bind(last_name)
    .bind(phone)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Shadow customer {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Customer {id} not found")))
}
