//! API response envelopes

use serde::Serialize;

use menu_core::domain::{Menu, MenuItem};
use menu_core::services::ReconcileOutcome;

/// Success envelope; the payload's fields sit next to `success`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Failure envelope.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageData {
    pub message: String,
}

impl MessageData {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SaveData {
    pub message: String,
    #[serde(flatten)]
    pub outcome: ReconcileOutcome,
}

/// Item fields exposed after a single-item create.
#[derive(Debug, Serialize)]
pub struct ItemDto {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub order: i32,
    pub is_external: bool,
    pub css_class: String,
    pub icon: String,
}

impl From<MenuItem> for ItemDto {
    fn from(item: MenuItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            url: item.url,
            order: item.order,
            is_external: item.is_external,
            css_class: item.css_class,
            icon: item.icon,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ItemData {
    pub item: ItemDto,
}

#[derive(Debug, Serialize)]
pub struct MenuData {
    pub menu: Menu,
}

#[derive(Debug, Serialize)]
pub struct MenuListData {
    pub menus: Vec<Menu>,
}
