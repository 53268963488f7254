//! Pricing configuration model

use serde::{Deserialize, Serialize};

/// Singleton pricing configuration
///
/// Mutated only by administrators. Orders snapshot the amounts derived
/// from the config in effect at creation time; they never reference the
/// config row itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PricingConfig {
    pub id: i64,
    pub completa_price: f64,
    pub extra_entree_price: f64,
    pub extra_side_price: f64,
    pub delivery_fee_per_meal: f64,
    pub updated_at: i64,
}

/// Admin update payload (partial)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfigUpdate {
    pub completa_price: Option<f64>,
    pub extra_entree_price: Option<f64>,
    pub extra_side_price: Option<f64>,
    pub delivery_fee_per_meal: Option<f64>,
}
