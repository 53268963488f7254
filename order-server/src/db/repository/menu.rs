//! Menu Repository
//!
//! Read side of the published weekly menu. The checkout engine consumes
//! this through a `MenuIndex` snapshot built from these queries.

use super::RepoResult;
use shared::models::{MenuItem, WeeklyMenu, WeeklyMenuItem};
use sqlx::SqlitePool;

pub async fn find_weekly_menu(pool: &SqlitePool, id: i64) -> RepoResult<Option<WeeklyMenu>> {
    let row = sqlx::query_as::<_, WeeklyMenu>("SELECT * FROM weekly_menu WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Latest published weekly menu (storefront "current week")
pub async fn find_current_menu(pool: &SqlitePool) -> RepoResult<Option<WeeklyMenu>> {
    let row = sqlx::query_as::<_, WeeklyMenu>(
        "SELECT * FROM weekly_menu WHERE is_published = 1 ORDER BY week_start_date DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Day associations for a weekly menu
pub async fn list_week_associations(
    pool: &SqlitePool,
    weekly_menu_id: i64,
) -> RepoResult<Vec<WeeklyMenuItem>> {
    let rows = sqlx::query_as::<_, WeeklyMenuItem>(
        "SELECT * FROM weekly_menu_item WHERE weekly_menu_id = ? ORDER BY day_of_week, menu_item_id",
    )
    .bind(weekly_menu_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Menu items attached to a weekly menu (distinct)
pub async fn list_week_items(pool: &SqlitePool, weekly_menu_id: i64) -> RepoResult<Vec<MenuItem>> {
    let rows = sqlx::query_as::<_, MenuItem>(
        "SELECT DISTINCT mi.* FROM menu_item mi \
         JOIN weekly_menu_item wmi ON wmi.menu_item_id = mi.id \
         WHERE wmi.weekly_menu_id = ? ORDER BY mi.id",
    )
    .bind(weekly_menu_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Staple items, orderable regardless of the published week
pub async fn list_staple_items(pool: &SqlitePool) -> RepoResult<Vec<MenuItem>> {
    let rows =
        sqlx::query_as::<_, MenuItem>("SELECT * FROM menu_item WHERE is_staple = 1 ORDER BY id")
            .fetch_all(pool)
            .await?;
    Ok(rows)
}
