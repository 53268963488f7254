//! Order Repository
//!
//! The order aggregate (orders + order_day + order_item) is created and
//! replaced atomically in one transaction. Day/item subtrees are never
//! mutated in place: edits replace the whole subtree so completa grouping
//! stays consistent.

use super::{RepoError, RepoResult};
use crate::checkout::grouping::DayDraft;
use shared::models::{Order, OrderDayDetail, OrderDetail, OrderItem, OrderStatus, PaymentStatus};
use sqlx::SqlitePool;

/// Attempts at generating a non-colliding order number before giving up
const ORDER_NUMBER_ATTEMPTS: u32 = 5;

/// Fields for a new order row (totals already computed)
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: i64,
    pub weekly_menu_id: i64,
    pub is_pickup: bool,
    pub address_id: Option<i64>,
    pub checkout_session_id: String,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub total_amount: f64,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub guest_token: Option<String>,
}

/// Create the order aggregate atomically.
///
/// The order number is random and verified against the UNIQUE index:
/// a collision regenerates and retries. A UNIQUE violation on the
/// checkout-session key is returned as `Duplicate` so the caller can fall
/// back to the already-created order (idempotent create).
pub async fn create(pool: &SqlitePool, new: NewOrder, days: &[DayDraft]) -> RepoResult<Order> {
    let now = shared::util::now_millis();

    for attempt in 0..ORDER_NUMBER_ATTEMPTS {
        let order_id = shared::util::snowflake_id();
        let order_number = shared::util::order_number();

        let mut tx = pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO orders (id, order_number, customer_id, weekly_menu_id, is_pickup, address_id, \
             checkout_session_id, subtotal, delivery_fee, total_amount, status, payment_status, \
             payment_method, notes, guest_token, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 'PENDING', 'PENDING', ?11, ?12, ?13, ?14, ?14)",
        )
        .bind(order_id)
        .bind(&order_number)
        .bind(new.customer_id)
        .bind(new.weekly_menu_id)
        .bind(new.is_pickup)
        .bind(new.address_id)
        .bind(&new.checkout_session_id)
        .bind(new.subtotal)
        .bind(new.delivery_fee)
        .bind(new.total_amount)
        .bind(&new.payment_method)
        .bind(&new.notes)
        .bind(&new.guest_token)
        .bind(now)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            Err(e) => {
                let repo_err = RepoError::from(e);
                tx.rollback().await.ok();
                if let RepoError::Duplicate(msg) = &repo_err {
                    if msg.contains("order_number") {
                        tracing::warn!(
                            order_number = %order_number,
                            attempt,
                            "Order number collision, regenerating"
                        );
                        continue;
                    }
                }
                return Err(repo_err);
            }
        }

        insert_days(&mut tx, order_id, days).await?;
        tx.commit().await?;

        let order = find_by_id(pool, order_id)
            .await?
            .ok_or_else(|| RepoError::Database("Order vanished after create".into()))?;
        return Ok(order);
    }

    Err(RepoError::Database(format!(
        "Could not generate a unique order number after {ORDER_NUMBER_ATTEMPTS} attempts"
    )))
}

async fn insert_days(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    order_id: i64,
    days: &[DayDraft],
) -> RepoResult<()> {
    for day in days {
        let day_id = shared::util::snowflake_id();
        sqlx::query("INSERT INTO order_day (id, order_id, day_of_week) VALUES (?1, ?2, ?3)")
            .bind(day_id)
            .bind(order_id)
            .bind(day.day_of_week)
            .execute(&mut **tx)
            .await?;

        for item in &day.items {
            sqlx::query(
                "INSERT INTO order_item (id, order_day_id, menu_item_id, quantity, unit_price, is_completa, completa_group_id) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(shared::util::snowflake_id())
            .bind(day_id)
            .bind(item.menu_item_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.is_completa)
            .bind(&item.completa_group_id)
            .execute(&mut **tx)
            .await?;
        }
    }
    Ok(())
}

/// Replace the whole day/item subtree of an order and store new totals
pub async fn replace_days(
    pool: &SqlitePool,
    order_id: i64,
    days: &[DayDraft],
    subtotal: f64,
    delivery_fee: f64,
    total_amount: f64,
) -> RepoResult<Order> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    // Cascade removes the order_item rows
    sqlx::query("DELETE FROM order_day WHERE order_id = ?")
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

    insert_days(&mut tx, order_id, days).await?;

    let rows = sqlx::query(
        "UPDATE orders SET subtotal = ?1, delivery_fee = ?2, total_amount = ?3, updated_at = ?4 WHERE id = ?5",
    )
    .bind(subtotal)
    .bind(delivery_fee)
    .bind(total_amount)
    .bind(now)
    .bind(order_id)
    .execute(&mut *tx)
    .await?;
    if rows.rows_affected() == 0 {
        tx.rollback().await.ok();
        return Err(RepoError::NotFound(format!("Order {order_id} not found")));
    }

    tx.commit().await?;
    find_by_id(pool, order_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {order_id} not found")))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_number(pool: &SqlitePool, number: &str) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_number = ?")
        .bind(number)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_guest_token(pool: &SqlitePool, token: &str) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE guest_token = ?")
        .bind(token)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Existing order for the same checkout session, if any (idempotency key)
pub async fn find_by_checkout_session(
    pool: &SqlitePool,
    customer_id: i64,
    weekly_menu_id: i64,
    checkout_session_id: &str,
) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE customer_id = ? AND weekly_menu_id = ? AND checkout_session_id = ?",
    )
    .bind(customer_id)
    .bind(weekly_menu_id)
    .bind(checkout_session_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn find_all(pool: &SqlitePool, limit: i32, offset: i32) -> RepoResult<Vec<Order>> {
    let rows =
        sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY created_at DESC LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
    Ok(rows)
}

/// Load the day/item subtree for an API read model
pub async fn load_detail(pool: &SqlitePool, order: Order) -> RepoResult<OrderDetail> {
    let days = sqlx::query_as::<_, shared::models::OrderDay>(
        "SELECT * FROM order_day WHERE order_id = ? ORDER BY day_of_week",
    )
    .bind(order.id)
    .fetch_all(pool)
    .await?;

    let mut detail_days = Vec::with_capacity(days.len());
    for day in days {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_item WHERE order_day_id = ? ORDER BY completa_group_id, id",
        )
        .bind(day.id)
        .fetch_all(pool)
        .await?;
        detail_days.push(OrderDayDetail {
            day_of_week: day.day_of_week,
            items,
        });
    }

    Ok(OrderDetail {
        order,
        days: detail_days,
    })
}

/// Meal count for delivery-fee purposes: every entree unit (bundled or
/// extra) counts; extra sides never do.
pub async fn meal_count(pool: &SqlitePool, order_id: i64) -> RepoResult<i64> {
    let count: (i64,) = sqlx::query_as(
        "SELECT COALESCE(SUM(oi.quantity), 0) FROM order_item oi \
         JOIN order_day od ON oi.order_day_id = od.id \
         JOIN menu_item mi ON mi.id = oi.menu_item_id \
         WHERE od.order_id = ? AND mi.kind = 'ENTREE'",
    )
    .bind(order_id)
    .fetch_one(pool)
    .await?;
    Ok(count.0)
}

pub async fn update_status(pool: &SqlitePool, id: i64, status: OrderStatus) -> RepoResult<Order> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
}

/// Store the recomputed cached payment status (materialized from the ledger)
pub async fn update_payment_state(
    pool: &SqlitePool,
    id: i64,
    payment_status: PaymentStatus,
    payment_method: Option<&str>,
) -> RepoResult<Order> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE orders SET payment_status = ?1, payment_method = COALESCE(?2, payment_method), updated_at = ?3 WHERE id = ?4",
    )
    .bind(payment_status)
    .bind(payment_method)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
}

/// Fulfillment toggle during checkout (same order row, last writer wins)
pub async fn update_fulfillment(
    pool: &SqlitePool,
    id: i64,
    is_pickup: bool,
    address_id: Option<i64>,
    delivery_fee: f64,
    total_amount: f64,
) -> RepoResult<Order> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE orders SET is_pickup = ?1, address_id = ?2, delivery_fee = ?3, total_amount = ?4, updated_at = ?5 WHERE id = ?6",
    )
    .bind(is_pickup)
    .bind(address_id)
    .bind(delivery_fee)
    .bind(total_amount)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
}
