//! Pricing Calculator
//!
//! Pure money math using rust_decimal for precision. All calculations run
//! in `Decimal` and convert to `f64` only for storage/serialization, with
//! rounding applied once at the end, never on intermediate products. The
//! active pricing config is an explicit argument; the calculator never
//! reaches for process-wide state.

use rust_decimal::prelude::*;
use shared::checkout::OrderDaySelection;
use shared::models::PricingConfig;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Convert f64 to Decimal for calculation
///
/// Monetary inputs are validated at the boundary; if NaN/Infinity somehow
/// reaches here, logs an error and returns ZERO to avoid silent data
/// corruption in financial calculations.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .expect("Decimal rounded to 2dp is always representable as f64")
}

/// Compare two monetary values for equality (within 0.01 tolerance)
pub fn money_eq(a: f64, b: f64) -> bool {
    let diff = (to_decimal(a) - to_decimal(b)).abs();
    diff < MONEY_TOLERANCE
}

/// Computed totals for a validated order shape
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTotals {
    /// Completas plus extra entrees; extra sides add cost but are not
    /// meals for delivery-fee purposes
    pub meal_count: i64,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub total_amount: f64,
}

/// Price a validated order shape against the active config.
///
/// ```text
/// meal_count   = Σ days (completa_count + extra_entree_qty)
/// subtotal     = Σ completa_count × completa_price
///              + Σ extra_entree_qty × extra_entree_price
///              + Σ extra_side_qty × extra_side_price
/// delivery_fee = is_pickup ? 0 : meal_count × delivery_fee_per_meal
/// total        = subtotal + delivery_fee
/// ```
pub fn price_order(
    days: &[OrderDaySelection],
    config: &PricingConfig,
    is_pickup: bool,
) -> OrderTotals {
    let completa_price = to_decimal(config.completa_price);
    let extra_entree_price = to_decimal(config.extra_entree_price);
    let extra_side_price = to_decimal(config.extra_side_price);

    let mut meal_count: i64 = 0;
    let mut subtotal = Decimal::ZERO;

    for day in days {
        let completas = day.completas.len() as i64;
        let extra_entrees: i64 = day.extra_entrees.iter().map(|e| i64::from(e.quantity)).sum();
        let extra_sides: i64 = day.extra_sides.iter().map(|e| i64::from(e.quantity)).sum();

        meal_count += completas + extra_entrees;
        subtotal += Decimal::from(completas) * completa_price
            + Decimal::from(extra_entrees) * extra_entree_price
            + Decimal::from(extra_sides) * extra_side_price;
    }

    let delivery_fee = delivery_fee_decimal(meal_count, config, is_pickup);
    let total = subtotal + delivery_fee;

    OrderTotals {
        meal_count,
        subtotal: to_f64(subtotal),
        delivery_fee: to_f64(delivery_fee),
        total_amount: to_f64(total),
    }
}

fn delivery_fee_decimal(meal_count: i64, config: &PricingConfig, is_pickup: bool) -> Decimal {
    if is_pickup {
        Decimal::ZERO
    } else {
        Decimal::from(meal_count) * to_decimal(config.delivery_fee_per_meal)
    }
}

/// Delivery fee for an already-persisted order (fulfillment toggles)
pub fn delivery_fee_for(meal_count: i64, config: &PricingConfig, is_pickup: bool) -> f64 {
    to_f64(delivery_fee_decimal(meal_count, config, is_pickup))
}
