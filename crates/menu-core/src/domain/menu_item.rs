// ============================================================================
// Menu Core - Menu Item Entity
// File: crates/menu-core/src/domain/menu_item.rs
// Description: Nestable, ordered entry of a menu
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use validator::Validate;

use super::menu::MenuId;

pub type ItemId = i64;

pub const DEFAULT_ITEM_TITLE: &str = "New Item";
pub const DEFAULT_ITEM_URL: &str = "#";

/// Menu Item entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: ItemId,
    pub menu_id: MenuId,
    pub parent_id: Option<ItemId>,
    pub title: String,
    pub url: String,
    pub order: i32,
    pub is_external: bool,
    pub css_class: String,
    pub icon: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The user-editable part of a menu item.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ItemFields {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: String,

    #[validate(length(max = 500, message = "URL must be at most 500 characters"))]
    pub url: String,

    #[validate(range(min = 0, message = "Order must be non-negative"))]
    pub order: i32,

    pub is_external: bool,

    #[validate(length(max = 100, message = "CSS class must be at most 100 characters"))]
    pub css_class: String,

    #[validate(length(max = 50, message = "Icon must be at most 50 characters"))]
    pub icon: String,
}

impl Default for ItemFields {
    fn default() -> Self {
        Self {
            title: DEFAULT_ITEM_TITLE.to_string(),
            url: DEFAULT_ITEM_URL.to_string(),
            order: 0,
            is_external: false,
            css_class: String::new(),
            icon: String::new(),
        }
    }
}

/// Menu item prior to insertion; the store assigns the id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMenuItem {
    pub menu_id: MenuId,
    pub parent_id: Option<ItemId>,
    pub fields: ItemFields,
}

/// Single-item create payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateMenuItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub order: Option<i32>,
    #[serde(default)]
    pub is_external: Option<bool>,
    #[serde(default)]
    pub css_class: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "number_or_numeric_text")]
    pub parent_id: Option<ItemId>,
}

/// Form-backed clients send ids as strings; an empty string means none.
fn number_or_numeric_text<'de, D>(deserializer: D) -> Result<Option<ItemId>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(ItemId),
        Text(String),
    }

    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawId::Number(id)) => Ok(Some(id)),
        Some(RawId::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse()
                .map(Some)
                .map_err(|_| de::Error::custom(format!("invalid item id: {:?}", text)))
        }
    }
}

impl CreateMenuItem {
    pub fn fields(&self) -> ItemFields {
        let defaults = ItemFields::default();
        ItemFields {
            title: self.title.clone().unwrap_or(defaults.title),
            url: self.url.clone().unwrap_or(defaults.url),
            order: self.order.unwrap_or(defaults.order),
            is_external: self.is_external.unwrap_or(defaults.is_external),
            css_class: self.css_class.clone().unwrap_or(defaults.css_class),
            icon: self.icon.clone().unwrap_or(defaults.icon),
        }
    }

    /// Non-positive parent ids mean "no parent".
    pub fn parent_id(&self) -> Option<ItemId> {
        self.parent_id.filter(|id| *id > 0)
    }
}

impl MenuItem {
    /// Overwrite the mutable fields and placement of an existing item.
    pub fn apply(&mut self, parent_id: Option<ItemId>, fields: ItemFields) {
        self.parent_id = parent_id;
        self.title = fields.title;
        self.url = fields.url;
        self.order = fields.order;
        self.is_external = fields.is_external;
        self.css_class = fields.css_class;
        self.icon = fields.icon;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_payload_defaults() {
        let request: CreateMenuItem = serde_json::from_str("{}").unwrap();
        let fields = request.fields();
        assert_eq!(fields, ItemFields::default());
        assert_eq!(fields.title, "New Item");
        assert_eq!(fields.url, "#");
        assert!(request.parent_id().is_none());
    }

    #[test]
    fn test_parent_id_accepts_numeric_text() {
        let parse = |body: &str| serde_json::from_str::<CreateMenuItem>(body).unwrap().parent_id();

        assert_eq!(parse(r#"{"parent_id": 12}"#), Some(12));
        assert_eq!(parse(r#"{"parent_id": "12"}"#), Some(12));
        assert_eq!(parse(r#"{"parent_id": " 7 "}"#), Some(7));
        assert_eq!(parse(r#"{"parent_id": ""}"#), None);
        assert_eq!(parse(r#"{"parent_id": null}"#), None);
        assert!(serde_json::from_str::<CreateMenuItem>(r#"{"parent_id": "twelve"}"#).is_err());
    }

    #[test]
    fn test_negative_order_rejected() {
        let request = CreateMenuItem {
            order: Some(-1),
            ..Default::default()
        };
        assert!(request.fields().validate().is_err());
    }

    #[test]
    fn test_overlong_icon_rejected() {
        let fields = ItemFields {
            icon: "x".repeat(51),
            ..Default::default()
        };
        assert!(fields.validate().is_err());
    }

    #[test]
    fn test_apply_moves_item() {
        let created = Utc::now();
        let mut item = MenuItem {
            id: 7,
            menu_id: 1,
            parent_id: None,
            title: "Home".to_string(),
            url: "/".to_string(),
            order: 3,
            is_external: true,
            css_class: "nav".to_string(),
            icon: "fa fa-home".to_string(),
            is_active: true,
            created_at: created,
            updated_at: created,
        };

        item.apply(Some(2), ItemFields { title: "Start".to_string(), ..Default::default() });

        assert_eq!(item.parent_id, Some(2));
        assert_eq!(item.title, "Start");
        assert_eq!(item.order, 0);
        assert!(!item.is_external);
        assert_eq!(item.created_at, created);
    }
}
