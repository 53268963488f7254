//! Pricing Config Repository
//!
//! Singleton row (id = 1). Orders snapshot the amounts computed from the
//! config in effect at creation time; a missing row is an operational
//! error surfaced by the caller, not a user-facing validation failure.

use super::RepoResult;
use shared::models::{PricingConfig, PricingConfigUpdate};
use sqlx::SqlitePool;

pub async fn get(pool: &SqlitePool) -> RepoResult<Option<PricingConfig>> {
    let row = sqlx::query_as::<_, PricingConfig>("SELECT * FROM pricing_config WHERE id = 1")
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Create or partially update the singleton config row
pub async fn upsert(pool: &SqlitePool, data: PricingConfigUpdate) -> RepoResult<PricingConfig> {
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO pricing_config (id, completa_price, extra_entree_price, extra_side_price, delivery_fee_per_meal, updated_at) \
         VALUES (1, COALESCE(?1, 0), COALESCE(?2, 0), COALESCE(?3, 0), COALESCE(?4, 0), ?5) \
         ON CONFLICT (id) DO UPDATE SET \
            completa_price        = COALESCE(?1, completa_price), \
            extra_entree_price    = COALESCE(?2, extra_entree_price), \
            extra_side_price      = COALESCE(?3, extra_side_price), \
            delivery_fee_per_meal = COALESCE(?4, delivery_fee_per_meal), \
            updated_at            = ?5",
    )
    .bind(data.completa_price)
    .bind(data.extra_entree_price)
    .bind(data.extra_side_price)
    .bind(data.delivery_fee_per_meal)
    .bind(now)
    .execute(pool)
    .await?;

    let config = get(pool)
        .await?
        .ok_or_else(|| super::RepoError::Database("Failed to upsert pricing config".into()))?;
    Ok(config)
}
