//! Order Composition Validator
//!
//! Checks a proposed multi-day order against structural and menu-content
//! rules, in a fixed sequence, failing fast with a distinct reason for
//! each violation. Pure over a [`MenuIndex`] snapshot of the published
//! weekly menu; the caller loads the snapshot and confirms address
//! ownership before calling in.

use super::error::CompositionError;
use shared::checkout::OrderDaySelection;
use shared::models::{MenuItem, MenuItemKind, WeeklyMenuItem};
use std::collections::{HashMap, HashSet};

/// Minimum distinct days per order
pub const MIN_DAYS_PER_ORDER: usize = 3;

/// Side servings per completa, exactly
pub const SIDES_PER_COMPLETA: i32 = 3;

/// Read-only snapshot of what is orderable this week
///
/// Built from the published menu's item associations plus the staple
/// items, which are orderable regardless of the rotation.
#[derive(Debug, Clone, Default)]
pub struct MenuIndex {
    items: HashMap<i64, MenuItem>,
    /// Entree id -> weekdays (1..5) it is offered
    entree_days: HashMap<i64, HashSet<i64>>,
    /// Side ids offered week-wide (`day_of_week = 0`)
    week_sides: HashSet<i64>,
}

impl MenuIndex {
    pub fn build(
        week_items: &[MenuItem],
        associations: &[WeeklyMenuItem],
        staples: &[MenuItem],
    ) -> Self {
        let mut index = Self::default();
        for item in week_items.iter().chain(staples) {
            index.items.insert(item.id, item.clone());
        }
        for assoc in associations {
            if assoc.day_of_week == 0 {
                index.week_sides.insert(assoc.menu_item_id);
            } else {
                index
                    .entree_days
                    .entry(assoc.menu_item_id)
                    .or_default()
                    .insert(assoc.day_of_week);
            }
        }
        index
    }

    pub fn item(&self, id: i64) -> Option<&MenuItem> {
        self.items.get(&id)
    }

    /// Whether an entree is legally offered on the given weekday
    fn entree_offered(&self, item: &MenuItem, day_of_week: i64) -> bool {
        item.is_staple
            || self
                .entree_days
                .get(&item.id)
                .is_some_and(|days| days.contains(&day_of_week))
    }

    /// Whether a side is legally offered this week
    fn side_offered(&self, item: &MenuItem) -> bool {
        item.is_staple || self.week_sides.contains(&item.id)
    }
}

/// Validate a candidate order against the composition rules.
///
/// Rules are applied in order; the first violation is returned:
/// 1. at least [`MIN_DAYS_PER_ORDER`] distinct days
/// 2. every day has at least one completa
/// 3. every completa has side quantities summing to exactly
///    [`SIDES_PER_COMPLETA`]
/// 4. per completa, at most one dessert serving and at most one soup
///    serving
/// 5. every referenced item exists and is legally offered for its slot
/// 6. delivery orders carry an address (`has_address` is the caller's
///    ownership-confirmed answer)
pub fn validate_composition(
    menu: &MenuIndex,
    days: &[OrderDaySelection],
    is_pickup: bool,
    has_address: bool,
) -> Result<(), CompositionError> {
    // Rule 1: distinct day slots, enough of them
    let mut seen_days = HashSet::new();
    for day in days {
        if !(1..=5).contains(&day.day_of_week) {
            return Err(CompositionError::InvalidDay(day.day_of_week));
        }
        if !seen_days.insert(day.day_of_week) {
            return Err(CompositionError::DuplicateDay(day.day_of_week));
        }
    }
    if seen_days.len() < MIN_DAYS_PER_ORDER {
        return Err(CompositionError::NotEnoughDays(seen_days.len()));
    }

    for day in days {
        // Rule 2: a day with only extras is not a valid day slot
        if day.completas.is_empty() {
            return Err(CompositionError::DayWithoutCompleta(day.day_of_week));
        }

        for completa in &day.completas {
            // Rule 3: exactly three side servings
            let mut side_total = 0;
            let mut desserts = 0;
            let mut soups = 0;
            for side in &completa.sides {
                if side.quantity <= 0 {
                    return Err(CompositionError::NonPositiveQuantity(day.day_of_week));
                }
                side_total += side.quantity;
                // Caps are counted over resolvable items; unknown ids are
                // reported by rule 5
                if let Some(item) = menu.item(side.menu_item_id) {
                    if item.is_dessert {
                        desserts += side.quantity;
                    }
                    if item.is_soup {
                        soups += side.quantity;
                    }
                }
            }
            if side_total != SIDES_PER_COMPLETA {
                return Err(CompositionError::WrongSideCount {
                    day: day.day_of_week,
                    got: side_total,
                });
            }

            // Rule 4: dessert/soup caps
            if desserts > 1 {
                return Err(CompositionError::TooManyDesserts(day.day_of_week));
            }
            if soups > 1 {
                return Err(CompositionError::TooManySoups(day.day_of_week));
            }

            // Rule 5: existence and day legality
            check_entree(menu, completa.entree_id, day.day_of_week)?;
            for side in &completa.sides {
                check_side(menu, side.menu_item_id)?;
            }
        }

        // Extras follow the same menu-content rules, without completa shape
        for extra in &day.extra_entrees {
            if extra.quantity <= 0 {
                return Err(CompositionError::NonPositiveQuantity(day.day_of_week));
            }
            check_entree(menu, extra.menu_item_id, day.day_of_week)?;
        }
        for extra in &day.extra_sides {
            if extra.quantity <= 0 {
                return Err(CompositionError::NonPositiveQuantity(day.day_of_week));
            }
            check_side(menu, extra.menu_item_id)?;
        }
    }

    // Rule 6: fulfillment
    if !is_pickup && !has_address {
        return Err(CompositionError::MissingDeliveryAddress);
    }

    Ok(())
}

fn check_entree(menu: &MenuIndex, id: i64, day_of_week: i64) -> Result<(), CompositionError> {
    let item = menu
        .item(id)
        .ok_or(CompositionError::UnknownMenuItem(id))?;
    if item.kind != MenuItemKind::Entree {
        return Err(CompositionError::NotAnEntree(item.name.clone()));
    }
    if !menu.entree_offered(item, day_of_week) {
        return Err(CompositionError::EntreeNotOffered {
            name: item.name.clone(),
            day: day_of_week,
        });
    }
    Ok(())
}

fn check_side(menu: &MenuIndex, id: i64) -> Result<(), CompositionError> {
    let item = menu
        .item(id)
        .ok_or(CompositionError::UnknownMenuItem(id))?;
    if item.kind != MenuItemKind::Side {
        return Err(CompositionError::NotASide(item.name.clone()));
    }
    if !menu.side_offered(item) {
        return Err(CompositionError::SideNotOffered(item.name.clone()));
    }
    Ok(())
}
