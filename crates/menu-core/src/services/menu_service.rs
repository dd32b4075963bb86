//! Menu Service

use std::sync::Arc;

use tracing::{info, warn};

use super::finish;
use crate::domain::{CreateMenu, ItemId, Menu, MenuId, NewMenu, UpdateMenu};
use crate::error::DomainError;
use crate::repositories::{MenuStore, MenuTransaction};

pub struct MenuService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: MenuStore + ?Sized> MenuService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// All menus, ordered by name.
    pub async fn list_menus(&self) -> Result<Vec<Menu>, DomainError> {
        let mut menus = self.store.list_menus().await?;
        menus.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(menus)
    }

    pub async fn get_menu(&self, menu_id: MenuId) -> Result<Menu, DomainError> {
        self.store
            .find_menu(menu_id)
            .await?
            .ok_or(DomainError::MenuNotFound(menu_id))
    }

    pub async fn create_menu(&self, request: CreateMenu) -> Result<Menu, DomainError> {
        let new_menu = NewMenu::new(request)?;
        let menu = self.store.create_menu(&new_menu).await?;
        info!("Created menu {} ({})", menu.id, menu.slug);
        Ok(menu)
    }

    pub async fn update_menu(
        &self,
        menu_id: MenuId,
        changes: UpdateMenu,
    ) -> Result<Menu, DomainError> {
        let mut menu = self.get_menu(menu_id).await?;
        menu.apply(changes)?;
        let menu = self.store.update_menu(&menu).await?;
        info!("Updated menu {} ({})", menu.id, menu.slug);
        Ok(menu)
    }

    /// Delete a menu with all of its items in one transaction.
    ///
    /// Returns the number of items removed.
    pub async fn delete_menu(&self, menu_id: MenuId) -> Result<u64, DomainError> {
        let mut tx = self.store.begin(menu_id).await?;
        let result = delete_everything(tx.as_mut()).await;
        if let Err(e) = &result {
            warn!("Deleting menu {} failed: {}", menu_id, e);
        }
        let deleted = finish(tx, result).await?;

        info!("Deleted menu {} with {} items", menu_id, deleted);
        Ok(deleted)
    }
}

async fn delete_everything(tx: &mut dyn MenuTransaction) -> Result<u64, DomainError> {
    let ids: Vec<ItemId> = tx.list_items().await?.into_iter().map(|item| item.id).collect();
    let deleted = if ids.is_empty() {
        0
    } else {
        tx.delete_items(&ids).await?
    };
    tx.delete_menu().await?;
    Ok(deleted)
}
