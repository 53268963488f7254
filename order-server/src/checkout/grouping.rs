//! Completa Grouping Assigner
//!
//! Deterministically partitions each day's selections into priced line
//! items. Bundle members share a group id unique within the order; the
//! entree carries the full completa price and sides are priced at zero,
//! so editing a completa's side mix never silently changes its charged
//! price. Extras are emitted individually priced with no group.

use shared::checkout::{ExtraSelection, OrderDaySelection};
use shared::models::PricingConfig;
use std::collections::BTreeMap;

/// Line item to be persisted as an OrderItem row
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    pub menu_item_id: i64,
    pub quantity: i32,
    pub unit_price: f64,
    pub is_completa: bool,
    pub completa_group_id: Option<String>,
}

/// One order day with its line items
#[derive(Debug, Clone, PartialEq)]
pub struct DayDraft {
    pub day_of_week: i64,
    pub items: Vec<ItemDraft>,
}

/// Turn validated day selections into priced line items.
///
/// Group ids are minted from a counter monotonically increasing across
/// the whole order; uniqueness only needs to hold within one order's
/// lifetime, since grouping is interpreted per-order.
pub fn assign_line_items(days: &[OrderDaySelection], config: &PricingConfig) -> Vec<DayDraft> {
    let mut group_seq: u32 = 0;

    days.iter()
        .map(|day| {
            let mut items = Vec::new();

            for completa in &day.completas {
                group_seq += 1;
                let group_id = format!("cg-{group_seq}");

                items.push(ItemDraft {
                    menu_item_id: completa.entree_id,
                    quantity: 1,
                    unit_price: config.completa_price,
                    is_completa: true,
                    completa_group_id: Some(group_id.clone()),
                });

                // One row per distinct side; bundle cost lives on the entree
                for (menu_item_id, quantity) in merge_quantities(
                    completa
                        .sides
                        .iter()
                        .map(|s| (s.menu_item_id, s.quantity)),
                ) {
                    items.push(ItemDraft {
                        menu_item_id,
                        quantity,
                        unit_price: 0.0,
                        is_completa: true,
                        completa_group_id: Some(group_id.clone()),
                    });
                }
            }

            push_extras(&mut items, &day.extra_entrees, config.extra_entree_price);
            push_extras(&mut items, &day.extra_sides, config.extra_side_price);

            DayDraft {
                day_of_week: day.day_of_week,
                items,
            }
        })
        .collect()
}

fn push_extras(items: &mut Vec<ItemDraft>, extras: &[ExtraSelection], unit_price: f64) {
    for (menu_item_id, quantity) in
        merge_quantities(extras.iter().map(|e| (e.menu_item_id, e.quantity)))
    {
        items.push(ItemDraft {
            menu_item_id,
            quantity,
            unit_price,
            is_completa: false,
            completa_group_id: None,
        });
    }
}

/// Merge duplicate menu item ids, keeping deterministic order
fn merge_quantities(pairs: impl Iterator<Item = (i64, i32)>) -> BTreeMap<i64, i32> {
    let mut merged = BTreeMap::new();
    for (id, qty) in pairs {
        *merged.entry(id).or_insert(0) += qty;
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::pricing::{money_eq, to_decimal};
    use rust_decimal::Decimal;
    use shared::checkout::{CompletaSelection, SideSelection};
    use std::collections::HashSet;

    fn config() -> PricingConfig {
        PricingConfig {
            id: 1,
            completa_price: 12.0,
            extra_entree_price: 7.0,
            extra_side_price: 3.0,
            delivery_fee_per_meal: 2.0,
            updated_at: 0,
        }
    }

    fn selection() -> Vec<OrderDaySelection> {
        vec![
            OrderDaySelection {
                day_of_week: 1,
                completas: vec![
                    CompletaSelection {
                        entree_id: 1,
                        sides: vec![
                            SideSelection {
                                menu_item_id: 20,
                                quantity: 2,
                            },
                            SideSelection {
                                menu_item_id: 21,
                                quantity: 1,
                            },
                        ],
                    },
                    CompletaSelection {
                        entree_id: 2,
                        sides: vec![SideSelection {
                            menu_item_id: 20,
                            quantity: 3,
                        }],
                    },
                ],
                extra_entrees: vec![ExtraSelection {
                    menu_item_id: 3,
                    quantity: 2,
                }],
                extra_sides: vec![],
            },
            OrderDaySelection {
                day_of_week: 2,
                completas: vec![CompletaSelection {
                    entree_id: 1,
                    sides: vec![SideSelection {
                        menu_item_id: 21,
                        quantity: 3,
                    }],
                }],
                extra_entrees: vec![],
                extra_sides: vec![ExtraSelection {
                    menu_item_id: 20,
                    quantity: 1,
                }],
            },
        ]
    }

    #[test]
    fn test_group_ids_unique_within_order() {
        let drafts = assign_line_items(&selection(), &config());
        let groups: HashSet<_> = drafts
            .iter()
            .flat_map(|d| d.items.iter())
            .filter_map(|i| i.completa_group_id.clone())
            .collect();
        // 3 completas across both days
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn test_each_group_prices_to_exactly_one_completa() {
        let cfg = config();
        let drafts = assign_line_items(&selection(), &cfg);
        for day in &drafts {
            let groups: HashSet<_> = day
                .items
                .iter()
                .filter_map(|i| i.completa_group_id.clone())
                .collect();
            for group in groups {
                let total: Decimal = day
                    .items
                    .iter()
                    .filter(|i| i.completa_group_id.as_deref() == Some(group.as_str()))
                    .map(|i| to_decimal(i.unit_price) * Decimal::from(i.quantity))
                    .sum();
                assert_eq!(total, to_decimal(cfg.completa_price));
            }
        }
    }

    #[test]
    fn test_sides_priced_at_zero() {
        let drafts = assign_line_items(&selection(), &config());
        for item in drafts.iter().flat_map(|d| d.items.iter()) {
            if item.is_completa && item.unit_price != 0.0 {
                // The entree row carries the bundle price
                assert!(money_eq(item.unit_price, 12.0));
                assert_eq!(item.quantity, 1);
            }
        }
    }

    #[test]
    fn test_extras_priced_individually_with_no_group() {
        let drafts = assign_line_items(&selection(), &config());
        let extras: Vec<_> = drafts
            .iter()
            .flat_map(|d| d.items.iter())
            .filter(|i| !i.is_completa)
            .collect();
        assert_eq!(extras.len(), 2);
        for extra in &extras {
            assert!(extra.completa_group_id.is_none());
            assert!(extra.unit_price > 0.0);
        }
    }

    #[test]
    fn test_duplicate_side_rows_merged() {
        let days = vec![OrderDaySelection {
            day_of_week: 1,
            completas: vec![CompletaSelection {
                entree_id: 1,
                sides: vec![
                    SideSelection {
                        menu_item_id: 20,
                        quantity: 1,
                    },
                    SideSelection {
                        menu_item_id: 20,
                        quantity: 2,
                    },
                ],
            }],
            extra_entrees: vec![],
            extra_sides: vec![],
        }];
        let drafts = assign_line_items(&days, &config());
        // entree row + single merged side row
        assert_eq!(drafts[0].items.len(), 2);
        assert_eq!(drafts[0].items[1].quantity, 3);
    }
}
