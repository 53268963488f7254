//! Pricing config handlers

use axum::Json;
use axum::extract::State;

use crate::core::ServerState;
use crate::db::repository::pricing_config;
use crate::utils::{AppError, AppResponse, AppResult, ok};
use shared::models::{PricingConfig, PricingConfigUpdate};

pub async fn get(State(state): State<ServerState>) -> AppResult<Json<AppResponse<PricingConfig>>> {
    let config = pricing_config::get(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Pricing config is not set".to_string()))?;
    Ok(ok(config))
}

/// Create or partially update the unit prices
pub async fn update(
    State(state): State<ServerState>,
    Json(payload): Json<PricingConfigUpdate>,
) -> AppResult<Json<AppResponse<PricingConfig>>> {
    for (field, value) in [
        ("completa_price", payload.completa_price),
        ("extra_entree_price", payload.extra_entree_price),
        ("extra_side_price", payload.extra_side_price),
        ("delivery_fee_per_meal", payload.delivery_fee_per_meal),
    ] {
        if let Some(v) = value
            && (!v.is_finite() || v < 0.0)
        {
            return Err(AppError::Validation(format!(
                "{field} must be a non-negative amount, got {v}"
            )));
        }
    }

    let config = pricing_config::upsert(&state.db, payload).await?;
    tracing::info!(
        completa_price = config.completa_price,
        extra_entree_price = config.extra_entree_price,
        extra_side_price = config.extra_side_price,
        delivery_fee_per_meal = config.delivery_fee_per_meal,
        "Pricing config updated"
    );
    Ok(ok(config))
}
