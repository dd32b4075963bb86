// ============================================================================
// Menu Core - Menu Entity
// File: crates/menu-core/src/domain/menu.rs
// Description: Menu container owning a forest of menu items
// ============================================================================

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use validator::Validate;

pub type MenuId = i64;

static SLUG_STRIP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9_\s-]").expect("slug strip pattern is valid"));
static SLUG_DASHES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-\s]+").expect("slug dash pattern is valid"));

/// Fold to ASCII via NFKD, lower-case, drop anything but alphanumerics, `_`,
/// `-` and whitespace, then collapse whitespace and dash runs into a single `-`.
pub fn slugify(value: &str) -> String {
    let folded: String = value.nfkd().filter(char::is_ascii).collect();
    let lowered = folded.to_lowercase();
    let stripped = SLUG_STRIP.replace_all(&lowered, "");
    SLUG_DASHES
        .replace_all(stripped.trim(), "-")
        .trim_matches(|c| c == '-' || c == '_')
        .to_string()
}

/// Menu entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    pub id: MenuId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Menu fields prior to insertion; the store assigns the id and timestamps.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewMenu {
    #[validate(length(min = 1, max = 100, message = "Menu name must be between 1 and 100 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 100, message = "Slug must be between 1 and 100 characters"))]
    pub slug: String,

    pub description: String,
    pub is_active: bool,
}

/// Create-menu payload. A missing or blank slug is derived from the name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateMenu {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Partial menu update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMenu {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

fn resolve_slug(requested: Option<&str>, name: &str) -> String {
    match requested.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => slugify(slug),
        None => slugify(name),
    }
}

impl NewMenu {
    pub fn new(request: CreateMenu) -> Result<Self, validator::ValidationErrors> {
        let name = request.name.trim().to_string();
        let menu = Self {
            slug: resolve_slug(request.slug.as_deref(), &name),
            name,
            description: request.description.map(|d| d.trim().to_string()).unwrap_or_default(),
            is_active: request.is_active.unwrap_or(true),
        };

        menu.validate()?;
        Ok(menu)
    }
}

impl Menu {
    /// Apply a partial update, re-validating the merged result.
    pub fn apply(&mut self, changes: UpdateMenu) -> Result<(), validator::ValidationErrors> {
        let name = changes
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or_else(|| self.name.clone());
        let slug = match changes.slug {
            Some(requested) => resolve_slug(Some(&requested), &name),
            None => self.slug.clone(),
        };

        let merged = NewMenu {
            name,
            slug,
            description: changes
                .description
                .map(|d| d.trim().to_string())
                .unwrap_or_else(|| self.description.clone()),
            is_active: changes.is_active.unwrap_or(self.is_active),
        };
        merged.validate()?;

        self.name = merged.name;
        self.slug = merged.slug;
        self.description = merged.description;
        self.is_active = merged.is_active;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(name: &str, slug: &str) -> Menu {
        Menu {
            id: 1,
            name: name.to_string(),
            slug: slug.to_string(),
            description: String::new(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Main Menu"), "main-menu");
        assert_eq!(slugify("  Footer -- Links! "), "footer-links");
        assert_eq!(slugify("already-slugged_name"), "already-slugged_name");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_folds_accents() {
        assert_eq!(slugify("Café"), "cafe");
        assert_eq!(slugify("Über Uns"), "uber-uns");
        assert_eq!(slugify("ﬁle №1"), "file-no1");
        assert_eq!(slugify("日本"), "");
    }

    #[test]
    fn test_create_menu_derives_slug() {
        let menu = NewMenu::new(CreateMenu {
            name: "Main Menu".to_string(),
            slug: Some("   ".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(menu.slug, "main-menu");
        assert!(menu.is_active);
        assert_eq!(menu.description, "");
    }

    #[test]
    fn test_create_menu_normalises_given_slug() {
        let menu = NewMenu::new(CreateMenu {
            name: "Main".to_string(),
            slug: Some("Top Nav".to_string()),
            is_active: Some(false),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(menu.slug, "top-nav");
        assert!(!menu.is_active);
    }

    #[test]
    fn test_create_menu_rejects_unsluggable_name() {
        let result = NewMenu::new(CreateMenu {
            name: "???".to_string(),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_keeps_unchanged_fields() {
        let mut menu = stored("Main", "main");
        menu.apply(UpdateMenu {
            description: Some("Top navigation".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(menu.slug, "main");
        assert_eq!(menu.name, "Main");
        assert_eq!(menu.description, "Top navigation");
    }

    #[test]
    fn test_apply_blank_slug_rederives_from_name() {
        let mut menu = stored("Main", "main");
        menu.apply(UpdateMenu {
            name: Some("Footer Links".to_string()),
            slug: Some(String::new()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(menu.slug, "footer-links");
    }
}
