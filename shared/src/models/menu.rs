//! Menu models
//!
//! A `WeeklyMenu` publishes the rotation for one week. Entrees are attached
//! to a concrete weekday (1..5); sides are attached with `day_of_week = 0`
//! meaning "available every day that week". Staple items are orderable
//! regardless of the published week.

use serde::{Deserialize, Serialize};

/// What a menu item is sold as
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum MenuItemKind {
    Entree,
    Side,
}

/// Menu item entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub kind: MenuItemKind,
    pub is_dessert: bool,
    pub is_soup: bool,
    pub is_staple: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Published weekly rotation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct WeeklyMenu {
    pub id: i64,
    /// Monday of the week, `YYYY-MM-DD`
    pub week_start_date: String,
    pub is_published: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Association of a menu item with a weekly menu
///
/// `day_of_week`: 0 = available all week, 1..5 = Monday..Friday
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct WeeklyMenuItem {
    pub weekly_menu_id: i64,
    pub menu_item_id: i64,
    pub day_of_week: i64,
}
