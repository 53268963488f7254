//! End-to-end checkout flow tests against an in-memory database.

use std::str::FromStr;
use std::sync::Arc;

use order_server::checkout::CheckoutService;
use order_server::lifecycle::{OrderLifecycle, RefundLocks};
use order_server::processor::NullProcessor;
use order_server::utils::AppError;
use shared::checkout::{
    CompletaSelection, CreateOrderRequest, GuestAddress, GuestInfo, OrderDaySelection,
    SideSelection, UpdateFulfillmentRequest,
};
use shared::models::{OrderStatus, PaymentStatus};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

async fn pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .pragma("foreign_keys", "ON");
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("open in-memory database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("apply migrations");
    pool
}

/// Seed a published week: entrees 1..=5 on Monday..Friday, entree 10 every
/// weekday, sides 20/21 week-wide plus dessert 22 and soup 23, staple
/// entree 30 and side 31. Prices: completa 12, extra entree 7, extra side
/// 3, delivery fee 2 per meal.
async fn seed(pool: &SqlitePool) {
    for (id, name, kind, dessert, soup, staple) in [
        (1, "Lentejas con chorizo", "ENTREE", 0, 0, 0),
        (2, "Pollo en mole", "ENTREE", 0, 0, 0),
        (3, "Milanesa", "ENTREE", 0, 0, 0),
        (4, "Pescado a la veracruzana", "ENTREE", 0, 0, 0),
        (5, "Chiles rellenos", "ENTREE", 0, 0, 0),
        (10, "Guisado del día", "ENTREE", 0, 0, 0),
        (20, "Arroz rojo", "SIDE", 0, 0, 0),
        (21, "Frijoles", "SIDE", 0, 0, 0),
        (22, "Flan", "SIDE", 1, 0, 0),
        (23, "Sopa de fideo", "SIDE", 0, 1, 0),
        (30, "Pollo asado", "ENTREE", 0, 0, 1),
        (31, "Tortillas", "SIDE", 0, 0, 1),
    ] {
        sqlx::query(
            "INSERT INTO menu_item (id, name, kind, is_dessert, is_soup, is_staple, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 0)",
        )
        .bind(id)
        .bind(name)
        .bind(kind)
        .bind(dessert)
        .bind(soup)
        .bind(staple)
        .execute(pool)
        .await
        .unwrap();
    }

    sqlx::query(
        "INSERT INTO weekly_menu (id, week_start_date, is_published, created_at, updated_at) \
         VALUES (100, '2026-08-03', 1, 0, 0)",
    )
    .execute(pool)
    .await
    .unwrap();

    for d in 1..=5i64 {
        for entree in [d, 10] {
            sqlx::query(
                "INSERT INTO weekly_menu_item (weekly_menu_id, menu_item_id, day_of_week) VALUES (100, ?1, ?2)",
            )
            .bind(entree)
            .bind(d)
            .execute(pool)
            .await
            .unwrap();
        }
    }
    for side in 20..=23i64 {
        sqlx::query(
            "INSERT INTO weekly_menu_item (weekly_menu_id, menu_item_id, day_of_week) VALUES (100, ?1, 0)",
        )
        .bind(side)
        .execute(pool)
        .await
        .unwrap();
    }

    sqlx::query(
        "INSERT INTO pricing_config (id, completa_price, extra_entree_price, extra_side_price, delivery_fee_per_meal, updated_at) \
         VALUES (1, 12.0, 7.0, 3.0, 2.0, 0)",
    )
    .execute(pool)
    .await
    .unwrap();
}

fn guest_info() -> GuestInfo {
    GuestInfo {
        email: "ana@example.com".to_string(),
        first_name: "Ana".to_string(),
        last_name: "Pérez".to_string(),
        phone: "600111222".to_string(),
    }
}

fn completa(entree_id: i64, sides: &[(i64, i32)]) -> CompletaSelection {
    CompletaSelection {
        entree_id,
        sides: sides
            .iter()
            .map(|&(menu_item_id, quantity)| SideSelection {
                menu_item_id,
                quantity,
            })
            .collect(),
    }
}

fn three_days() -> Vec<OrderDaySelection> {
    (1..=3)
        .map(|d| OrderDaySelection {
            day_of_week: d,
            completas: vec![completa(d, &[(20, 2), (21, 1)])],
            extra_entrees: vec![],
            extra_sides: vec![],
        })
        .collect()
}

fn pickup_request(session: &str) -> CreateOrderRequest {
    CreateOrderRequest {
        weekly_menu_id: 100,
        days: three_days(),
        is_pickup: true,
        address_id: None,
        guest_address: None,
        guest_info: Some(guest_info()),
        checkout_session_id: session.to_string(),
        payment_method: Some("card".to_string()),
        notes: None,
    }
}

#[tokio::test]
async fn test_guest_pickup_order_end_to_end() {
    let pool = pool().await;
    seed(&pool).await;
    let checkout = CheckoutService::new(pool.clone());

    let detail = checkout
        .create_order(None, pickup_request("sess-1"))
        .await
        .unwrap();

    assert!(detail.order.order_number.starts_with("LL-"));
    assert_eq!(detail.order.status, OrderStatus::Pending);
    assert_eq!(detail.order.payment_status, PaymentStatus::Pending);
    assert_eq!(detail.order.subtotal, 36.0);
    assert_eq!(detail.order.delivery_fee, 0.0);
    assert_eq!(detail.order.total_amount, 36.0);
    assert!(detail.order.guest_token.is_some());
    assert!(detail.order.address_id.is_none());

    // 3 days, each with one entree row (priced) + two side rows (free)
    assert_eq!(detail.days.len(), 3);
    for day in &detail.days {
        assert_eq!(day.items.len(), 3);
        let entree = day.items.iter().find(|i| i.unit_price > 0.0).unwrap();
        assert!(entree.is_completa);
        assert_eq!(entree.unit_price, 12.0);
        let group = entree.completa_group_id.as_ref().unwrap();
        for item in &day.items {
            assert_eq!(item.completa_group_id.as_ref(), Some(group));
        }
    }
}

#[tokio::test]
async fn test_same_session_creates_one_order() {
    let pool = pool().await;
    seed(&pool).await;
    let checkout = CheckoutService::new(pool.clone());

    let first = checkout
        .create_order(None, pickup_request("sess-dup"))
        .await
        .unwrap();
    let second = checkout
        .create_order(None, pickup_request("sess-dup"))
        .await
        .unwrap();
    assert_eq!(first.order.id, second.order.id);

    // A fresh session is a new checkout
    let third = checkout
        .create_order(None, pickup_request("sess-new"))
        .await
        .unwrap();
    assert_ne!(first.order.id, third.order.id);
}

#[tokio::test]
async fn test_guest_delivery_order_charges_per_meal_fee() {
    let pool = pool().await;
    seed(&pool).await;
    let checkout = CheckoutService::new(pool.clone());

    let mut req = pickup_request("sess-del");
    req.is_pickup = false;
    req.guest_address = Some(GuestAddress {
        line1: "Calle Mayor 5".to_string(),
        line2: None,
        city: "Madrid".to_string(),
        postal_code: "28013".to_string(),
        delivery_notes: Some("portal B".to_string()),
    });

    let detail = checkout.create_order(None, req).await.unwrap();
    assert_eq!(detail.order.delivery_fee, 6.0); // 3 meals x 2
    assert_eq!(detail.order.total_amount, 42.0);
    assert!(detail.order.address_id.is_some());
}

#[tokio::test]
async fn test_delivery_without_address_is_rejected_verbatim() {
    let pool = pool().await;
    seed(&pool).await;
    let checkout = CheckoutService::new(pool.clone());

    let mut req = pickup_request("sess-noaddr");
    req.is_pickup = false;

    let err = checkout.create_order(None, req).await.unwrap_err();
    match err {
        AppError::Validation(msg) => {
            assert_eq!(msg, "A delivery order needs a delivery address");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_two_day_order_rejected_with_minimum_days_reason() {
    let pool = pool().await;
    seed(&pool).await;
    let checkout = CheckoutService::new(pool.clone());

    let mut req = pickup_request("sess-2d");
    req.days.truncate(2);

    let err = checkout.create_order(None, req).await.unwrap_err();
    match err {
        AppError::Validation(msg) => assert!(msg.contains("at least 3 distinct days"), "{msg}"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_pricing_config_is_a_config_error() {
    let pool = pool().await;
    seed(&pool).await;
    sqlx::query("DELETE FROM pricing_config")
        .execute(&pool)
        .await
        .unwrap();

    let checkout = CheckoutService::new(pool.clone());
    let err = checkout
        .create_order(None, pickup_request("sess-nocfg"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}

#[tokio::test]
async fn test_authenticated_checkout_has_no_guest_token() {
    let pool = pool().await;
    seed(&pool).await;

    let customer_id = 9001i64;
    sqlx::query(
        "INSERT INTO customer (id, email, first_name, last_name, phone, password_hash, created_at, updated_at) \
         VALUES (?1, 'luis@example.com', 'Luis', 'García', NULL, 'argon2-hash', 0, 0)",
    )
    .bind(customer_id)
    .execute(&pool)
    .await
    .unwrap();

    let checkout = CheckoutService::new(pool.clone());
    let mut req = pickup_request("sess-auth");
    req.guest_info = None;

    let detail = checkout.create_order(Some(customer_id), req).await.unwrap();
    assert_eq!(detail.order.customer_id, customer_id);
    assert!(detail.order.guest_token.is_none());
}

#[tokio::test]
async fn test_replace_days_swaps_subtree_and_reprices() {
    let pool = pool().await;
    seed(&pool).await;
    let checkout = CheckoutService::new(pool.clone());

    let detail = checkout
        .create_order(None, pickup_request("sess-edit"))
        .await
        .unwrap();

    // Grow to 4 days with an extra entree on Monday
    let mut days = three_days();
    days.push(OrderDaySelection {
        day_of_week: 4,
        completas: vec![completa(4, &[(20, 3)])],
        extra_entrees: vec![],
        extra_sides: vec![],
    });
    days[0].extra_entrees.push(shared::checkout::ExtraSelection {
        menu_item_id: 10,
        quantity: 1,
    });

    let updated = checkout.replace_days(detail.order.id, days).await.unwrap();
    assert_eq!(updated.days.len(), 4);
    assert_eq!(updated.order.subtotal, 55.0); // 4 x 12 + 7
    assert_eq!(updated.order.total_amount, 55.0);

    // The old subtree is gone, not appended to
    let day_count: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM order_day WHERE order_id = ?")
            .bind(detail.order.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(day_count.0, 4);
}

#[tokio::test]
async fn test_terminal_orders_reject_edits() {
    let pool = pool().await;
    seed(&pool).await;
    let checkout = CheckoutService::new(pool.clone());
    let lifecycle = OrderLifecycle::new(
        pool.clone(),
        Arc::new(NullProcessor),
        Arc::new(RefundLocks::new()),
    );

    let detail = checkout
        .create_order(None, pickup_request("sess-term"))
        .await
        .unwrap();
    lifecycle
        .set_status(detail.order.id, OrderStatus::Cancelled)
        .await
        .unwrap();

    let err = checkout
        .replace_days(detail.order.id, three_days())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));
}

#[tokio::test]
async fn test_fulfillment_toggle_updates_fee_only() {
    let pool = pool().await;
    seed(&pool).await;
    let checkout = CheckoutService::new(pool.clone());

    let detail = checkout
        .create_order(None, pickup_request("sess-toggle"))
        .await
        .unwrap();
    assert_eq!(detail.order.total_amount, 36.0);

    // Pickup -> delivery: the same order row gains the per-meal fee
    let updated = checkout
        .update_fulfillment(
            detail.order.id,
            UpdateFulfillmentRequest {
                is_pickup: false,
                address_id: None,
                guest_address: Some(GuestAddress {
                    line1: "Calle Mayor 5".to_string(),
                    line2: None,
                    city: "Madrid".to_string(),
                    postal_code: "28013".to_string(),
                    delivery_notes: None,
                }),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.id, detail.order.id);
    assert_eq!(updated.subtotal, 36.0);
    assert_eq!(updated.delivery_fee, 6.0);
    assert_eq!(updated.total_amount, 42.0);

    // And back: address dropped, fee zeroed
    let reverted = checkout
        .update_fulfillment(
            detail.order.id,
            UpdateFulfillmentRequest {
                is_pickup: true,
                address_id: None,
                guest_address: None,
            },
        )
        .await
        .unwrap();
    assert!(reverted.address_id.is_none());
    assert_eq!(reverted.delivery_fee, 0.0);
    assert_eq!(reverted.total_amount, 36.0);
}

#[tokio::test]
async fn test_fulfillment_locked_after_payment() {
    let pool = pool().await;
    seed(&pool).await;
    let checkout = CheckoutService::new(pool.clone());
    let lifecycle = OrderLifecycle::new(
        pool.clone(),
        Arc::new(NullProcessor),
        Arc::new(RefundLocks::new()),
    );

    let detail = checkout
        .create_order(None, pickup_request("sess-paidlock"))
        .await
        .unwrap();
    lifecycle.confirm_payment(detail.order.id, None).await.unwrap();

    let err = checkout
        .update_fulfillment(
            detail.order.id,
            UpdateFulfillmentRequest {
                is_pickup: true,
                address_id: None,
                guest_address: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));
}

#[tokio::test]
async fn test_guest_lookup_by_token() {
    let pool = pool().await;
    seed(&pool).await;
    let checkout = CheckoutService::new(pool.clone());

    let detail = checkout
        .create_order(None, pickup_request("sess-token"))
        .await
        .unwrap();
    let token = detail.order.guest_token.clone().unwrap();

    let found = order_server::checkout::find_guest_order(&pool, &token)
        .await
        .unwrap();
    assert_eq!(found.order.id, detail.order.id);

    let err = order_server::checkout::find_guest_order(&pool, "no-such-token")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
