//! Composition validation errors
//!
//! Every rule violation carries a specific, user-facing reason; downstream
//! callers surface these verbatim. Never collapse them into a generic
//! "invalid order" flag.

use super::composition::{MIN_DAYS_PER_ORDER, SIDES_PER_COMPLETA};
use thiserror::Error;

/// Reasons a proposed order composition is rejected
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompositionError {
    #[error("Day of week must be between 1 (Monday) and 5 (Friday), got {0}")]
    InvalidDay(i64),

    #[error("Day {0} appears more than once in the order")]
    DuplicateDay(i64),

    #[error("An order must cover at least {MIN_DAYS_PER_ORDER} distinct days ({0} selected)")]
    NotEnoughDays(usize),

    #[error("Each ordered day needs at least one completa (day {0} has none)")]
    DayWithoutCompleta(i64),

    #[error("Item quantities must be positive (day {0})")]
    NonPositiveQuantity(i64),

    #[error("A completa needs exactly {SIDES_PER_COMPLETA} side servings, got {got} (day {day})")]
    WrongSideCount { day: i64, got: i32 },

    #[error("A completa can include at most one dessert serving (day {0})")]
    TooManyDesserts(i64),

    #[error("A completa can include at most one soup serving (day {0})")]
    TooManySoups(i64),

    #[error("Menu item {0} is not on this week's menu")]
    UnknownMenuItem(i64),

    #[error("\"{0}\" is a side, not an entree")]
    NotAnEntree(String),

    #[error("\"{0}\" is an entree, not a side")]
    NotASide(String),

    #[error("\"{name}\" is not offered on day {day}")]
    EntreeNotOffered { name: String, day: i64 },

    #[error("\"{0}\" is not offered this week")]
    SideNotOffered(String),

    #[error("A delivery order needs a delivery address")]
    MissingDeliveryAddress,
}
