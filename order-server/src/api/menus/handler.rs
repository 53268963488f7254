//! Weekly menu handlers (read-only browse surface)

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::repository::menu;
use crate::utils::{AppError, AppResponse, AppResult, ok};
use shared::models::{MenuItem, WeeklyMenu, WeeklyMenuItem};

/// Published menu with everything the storefront needs to render a week
#[derive(Debug, Serialize)]
pub struct MenuResponse {
    #[serde(flatten)]
    pub menu: WeeklyMenu,
    pub items: Vec<MenuItem>,
    /// `(menu_item_id, day_of_week)` pairs; 0 = all week
    pub associations: Vec<WeeklyMenuItem>,
    pub staples: Vec<MenuItem>,
}

async fn load_response(state: &ServerState, menu_row: WeeklyMenu) -> AppResult<MenuResponse> {
    let items = menu::list_week_items(&state.db, menu_row.id).await?;
    let associations = menu::list_week_associations(&state.db, menu_row.id).await?;
    let staples = menu::list_staple_items(&state.db).await?;
    Ok(MenuResponse {
        menu: menu_row,
        items,
        associations,
        staples,
    })
}

/// Latest published weekly menu
pub async fn current(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<MenuResponse>>> {
    let menu_row = menu::find_current_menu(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No published weekly menu".to_string()))?;
    Ok(ok(load_response(&state, menu_row).await?))
}

/// Weekly menu by id (admin and print views may read unpublished weeks)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<MenuResponse>>> {
    let menu_row = menu::find_weekly_menu(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Weekly menu {id} not found")))?;
    Ok(ok(load_response(&state, menu_row).await?))
}
