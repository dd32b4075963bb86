//! Menu CRUD handlers

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
    Json,
};

use menu_core::domain::{CreateMenu, MenuId, UpdateMenu};

use super::parse_json;
use crate::error::ApiError;
use crate::response::{ApiResponse, MenuData, MenuListData, MessageData};
use crate::state::AppState;

/// GET /api/menus/
pub async fn list_menus(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<MenuListData>>, ApiError> {
    let menus = state.menus.list_menus().await?;
    Ok(Json(ApiResponse::success(MenuListData { menus })))
}

/// POST /api/menus/
pub async fn create_menu(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ApiResponse<MenuData>>, ApiError> {
    let request: CreateMenu = parse_json(&body?)?;
    let menu = state.menus.create_menu(request).await?;
    Ok(Json(ApiResponse::success(MenuData { menu })))
}

/// GET /api/menu/{menu_id}/
pub async fn get_menu(
    State(state): State<AppState>,
    path: Result<Path<MenuId>, PathRejection>,
) -> Result<Json<ApiResponse<MenuData>>, ApiError> {
    let Path(menu_id) = path?;
    let menu = state.menus.get_menu(menu_id).await?;
    Ok(Json(ApiResponse::success(MenuData { menu })))
}

/// POST /api/menu/{menu_id}/update/
pub async fn update_menu(
    State(state): State<AppState>,
    path: Result<Path<MenuId>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ApiResponse<MenuData>>, ApiError> {
    let Path(menu_id) = path?;
    let changes: UpdateMenu = parse_json(&body?)?;
    let menu = state.menus.update_menu(menu_id, changes).await?;
    Ok(Json(ApiResponse::success(MenuData { menu })))
}

/// POST /api/menu/{menu_id}/delete/
pub async fn delete_menu(
    State(state): State<AppState>,
    path: Result<Path<MenuId>, PathRejection>,
) -> Result<Json<ApiResponse<MessageData>>, ApiError> {
    let Path(menu_id) = path?;
    let deleted = state.menus.delete_menu(menu_id).await?;
    Ok(Json(ApiResponse::success(MessageData::new(format!(
        "Menu deleted with {} items",
        deleted
    )))))
}
