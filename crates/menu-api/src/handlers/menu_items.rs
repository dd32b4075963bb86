// ============================================================================
// Menu API - Menu Item Handlers
// File: crates/menu-api/src/handlers/menu_items.rs
// ============================================================================
//! Tree read/save and single-item create/delete.

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;

use menu_core::domain::{CreateMenuItem, ItemId, ItemNode, MenuId};

use super::parse_json;
use crate::error::ApiError;
use crate::response::{ApiResponse, ItemData, MessageData, SaveData};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListItemsQuery {
    #[serde(default)]
    pub active_only: bool,
}

/// GET /api/menu/{menu_id}/items/
pub async fn list_items(
    State(state): State<AppState>,
    path: Result<Path<MenuId>, PathRejection>,
    query: Result<Query<ListItemsQuery>, QueryRejection>,
) -> Result<Json<Vec<ItemNode>>, ApiError> {
    let Path(menu_id) = path?;
    let Query(query) = query?;

    let tree = state.structure.list_items(menu_id, query.active_only).await?;
    Ok(Json(tree))
}

/// POST /api/menu/{menu_id}/save/
pub async fn save_structure(
    State(state): State<AppState>,
    path: Result<Path<MenuId>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ApiResponse<SaveData>>, ApiError> {
    let Path(menu_id) = path?;
    let tree = ItemNode::parse_tree(&body?)?;

    let outcome = state.structure.reconcile(menu_id, &tree).await?;
    Ok(Json(ApiResponse::success(SaveData {
        message: "Menu structure saved successfully".to_string(),
        outcome,
    })))
}

/// POST /api/menu/{menu_id}/item/create/
pub async fn create_item(
    State(state): State<AppState>,
    path: Result<Path<MenuId>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ApiResponse<ItemData>>, ApiError> {
    let Path(menu_id) = path?;
    let request: CreateMenuItem = parse_json(&body?)?;

    let item = state.items.create_item(menu_id, request).await?;
    Ok(Json(ApiResponse::success(ItemData { item: item.into() })))
}

/// POST /api/item/{item_id}/delete/
pub async fn delete_item(
    State(state): State<AppState>,
    path: Result<Path<ItemId>, PathRejection>,
) -> Result<Json<ApiResponse<MessageData>>, ApiError> {
    let Path(item_id) = path?;

    let deleted = state.items.delete_item(item_id).await?;
    let message = match deleted.len() {
        1 => "Item deleted successfully".to_string(),
        n => format!("Item and {} descendants deleted successfully", n - 1),
    };
    Ok(Json(ApiResponse::success(MessageData::new(message))))
}
