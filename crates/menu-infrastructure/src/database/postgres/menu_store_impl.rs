// ============================================================================
// Menu Infrastructure - PostgreSQL Menu Store
// File: crates/menu-infrastructure/src/database/postgres/menu_store_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::{debug, error, info};

use menu_core::domain::{ItemId, Menu, MenuId, MenuItem, NewMenu, NewMenuItem};
use menu_core::error::DomainError;
use menu_core::repositories::{MenuStore, MenuTransaction};

const MENU_COLUMNS: &str = "id, name, slug, description, is_active, created_at, updated_at";
const ITEM_COLUMNS: &str = "id, menu_id, parent_id, title, url, sort_order, is_external, \
                            css_class, icon, is_active, created_at, updated_at";

pub struct PgMenuStore {
    pool: PgPool,
}

impl PgMenuStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row types for SQLx mapping
#[derive(Debug, FromRow)]
struct MenuRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MenuRow> for Menu {
    fn from(row: MenuRow) -> Self {
        Menu {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct MenuItemRow {
    pub id: i64,
    pub menu_id: i64,
    pub parent_id: Option<i64>,
    pub title: String,
    pub url: String,
    pub sort_order: i32,
    pub is_external: bool,
    pub css_class: String,
    pub icon: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MenuItemRow> for MenuItem {
    fn from(row: MenuItemRow) -> Self {
        MenuItem {
            id: row.id,
            menu_id: row.menu_id,
            parent_id: row.parent_id,
            title: row.title,
            url: row.url,
            order: row.sort_order,
            is_external: row.is_external,
            css_class: row.css_class,
            icon: row.icon,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn database_error(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e: sqlx::Error| {
        error!("Database error {}: {}", context, e);
        DomainError::DatabaseError(e.to_string())
    }
}

/// Unique violations on the name and slug constraints become conflicts.
fn menu_write_error(menu_name: &str, menu_slug: &str, e: sqlx::Error) -> DomainError {
    let constraint = e
        .as_database_error()
        .filter(|db| db.is_unique_violation())
        .and_then(|db| db.constraint().map(str::to_owned));

    match constraint.as_deref() {
        Some("menus_slug_key") => DomainError::MenuSlugAlreadyExists(menu_slug.to_string()),
        Some("menus_name_key") => DomainError::MenuNameAlreadyExists(menu_name.to_string()),
        _ => {
            error!("Database error writing menu: {}", e);
            DomainError::DatabaseError(e.to_string())
        }
    }
}

#[async_trait]
impl MenuStore for PgMenuStore {
    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(database_error("pinging database"))?;
        Ok(())
    }

    async fn list_menus(&self) -> Result<Vec<Menu>, DomainError> {
        let rows: Vec<MenuRow> =
            sqlx::query_as(&format!("SELECT {} FROM menus ORDER BY name", MENU_COLUMNS))
                .fetch_all(&self.pool)
                .await
                .map_err(database_error("listing menus"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_menu(&self, id: MenuId) -> Result<Option<Menu>, DomainError> {
        let row: Option<MenuRow> =
            sqlx::query_as(&format!("SELECT {} FROM menus WHERE id = $1", MENU_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error("finding menu by id"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn create_menu(&self, menu: &NewMenu) -> Result<Menu, DomainError> {
        info!("Creating menu: {}", menu.name);

        let row: MenuRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO menus (name, slug, description, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            MENU_COLUMNS
        ))
        .bind(&menu.name)
        .bind(&menu.slug)
        .bind(&menu.description)
        .bind(menu.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| menu_write_error(&menu.name, &menu.slug, e))?;

        info!("Menu created successfully: {}", row.id);
        Ok(row.into())
    }

    async fn update_menu(&self, menu: &Menu) -> Result<Menu, DomainError> {
        let row: Option<MenuRow> = sqlx::query_as(&format!(
            r#"
            UPDATE menus
            SET
                name = $2,
                slug = $3,
                description = $4,
                is_active = $5,
                updated_at = $6
            WHERE id = $1
            RETURNING {}
            "#,
            MENU_COLUMNS
        ))
        .bind(menu.id)
        .bind(&menu.name)
        .bind(&menu.slug)
        .bind(&menu.description)
        .bind(menu.is_active)
        .bind(menu.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| menu_write_error(&menu.name, &menu.slug, e))?;

        row.map(Into::into).ok_or(DomainError::MenuNotFound(menu.id))
    }

    async fn list_items(&self, menu_id: MenuId) -> Result<Vec<MenuItem>, DomainError> {
        let rows: Vec<MenuItemRow> = sqlx::query_as(&format!(
            "SELECT {} FROM menu_items WHERE menu_id = $1",
            ITEM_COLUMNS
        ))
        .bind(menu_id)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("listing menu items"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_item(&self, id: ItemId) -> Result<Option<MenuItem>, DomainError> {
        let row: Option<MenuItemRow> =
            sqlx::query_as(&format!("SELECT {} FROM menu_items WHERE id = $1", ITEM_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error("finding menu item by id"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn begin(&self, menu_id: MenuId) -> Result<Box<dyn MenuTransaction>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(database_error("starting transaction"))?;

        // Row lock on the menu serialises writers of the same menu.
        let locked: Option<(i64,)> = sqlx::query_as("SELECT id FROM menus WHERE id = $1 FOR UPDATE")
            .bind(menu_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(database_error("locking menu"))?;

        if locked.is_none() {
            return Err(DomainError::MenuNotFound(menu_id));
        }

        debug!("Locked menu {} for writing", menu_id);
        Ok(Box::new(PgMenuTransaction { menu_id, tx }))
    }
}

/// Open transaction holding the row lock of one menu. Dropping it rolls back.
pub struct PgMenuTransaction {
    menu_id: MenuId,
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl MenuTransaction for PgMenuTransaction {
    fn menu_id(&self) -> MenuId {
        self.menu_id
    }

    async fn list_items(&mut self) -> Result<Vec<MenuItem>, DomainError> {
        let rows: Vec<MenuItemRow> = sqlx::query_as(&format!(
            "SELECT {} FROM menu_items WHERE menu_id = $1",
            ITEM_COLUMNS
        ))
        .bind(self.menu_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(database_error("listing menu items"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_item(&mut self, id: ItemId) -> Result<Option<MenuItem>, DomainError> {
        let row: Option<MenuItemRow> = sqlx::query_as(&format!(
            "SELECT {} FROM menu_items WHERE id = $1 AND menu_id = $2",
            ITEM_COLUMNS
        ))
        .bind(id)
        .bind(self.menu_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(database_error("finding menu item by id"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn insert_item(&mut self, item: &NewMenuItem) -> Result<MenuItem, DomainError> {
        let row: MenuItemRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO menu_items (
                menu_id, parent_id, title, url, sort_order,
                is_external, css_class, icon
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(self.menu_id)
        .bind(item.parent_id)
        .bind(&item.fields.title)
        .bind(&item.fields.url)
        .bind(item.fields.order)
        .bind(item.fields.is_external)
        .bind(&item.fields.css_class)
        .bind(&item.fields.icon)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(database_error("inserting menu item"))?;

        Ok(row.into())
    }

    async fn update_item(&mut self, item: &MenuItem) -> Result<MenuItem, DomainError> {
        if item.parent_id == Some(item.id) {
            return Err(DomainError::ValidationError(format!(
                "Item {} cannot be its own parent",
                item.id
            )));
        }

        let row: Option<MenuItemRow> = sqlx::query_as(&format!(
            r#"
            UPDATE menu_items
            SET
                parent_id = $3,
                title = $4,
                url = $5,
                sort_order = $6,
                is_external = $7,
                css_class = $8,
                icon = $9,
                is_active = $10,
                updated_at = $11
            WHERE id = $1 AND menu_id = $2
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(item.id)
        .bind(self.menu_id)
        .bind(item.parent_id)
        .bind(&item.title)
        .bind(&item.url)
        .bind(item.order)
        .bind(item.is_external)
        .bind(&item.css_class)
        .bind(&item.icon)
        .bind(item.is_active)
        .bind(item.updated_at)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(database_error("updating menu item"))?;

        row.map(Into::into).ok_or(DomainError::ItemNotFound(item.id))
    }

    async fn delete_items(&mut self, ids: &[ItemId]) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM menu_items WHERE menu_id = $1 AND id = ANY($2)")
            .bind(self.menu_id)
            .bind(ids)
            .execute(&mut *self.tx)
            .await
            .map_err(database_error("deleting menu items"))?;

        Ok(result.rows_affected())
    }

    async fn delete_menu(&mut self) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(self.menu_id)
            .execute(&mut *self.tx)
            .await
            .map_err(database_error("deleting menu"))?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.tx
            .commit()
            .await
            .map_err(database_error("committing transaction"))
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        self.tx
            .rollback()
            .await
            .map_err(database_error("rolling back transaction"))
    }
}
