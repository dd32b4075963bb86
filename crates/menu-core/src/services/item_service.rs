//! Single-item create and delete outside the tree editor.

use std::sync::Arc;

use tracing::{info, warn};
use validator::Validate;

use super::finish;
use crate::domain::{collect_subtree, CreateMenuItem, ItemId, MenuId, MenuItem, NewMenuItem};
use crate::error::DomainError;
use crate::repositories::{MenuStore, MenuTransaction};

pub struct ItemService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: MenuStore + ?Sized> ItemService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create one item in `menu_id`. A parent, when given, must belong to the
    /// same menu.
    pub async fn create_item(
        &self,
        menu_id: MenuId,
        request: CreateMenuItem,
    ) -> Result<MenuItem, DomainError> {
        let fields = request.fields();
        fields.validate()?;
        let parent_id = request.parent_id();

        let mut tx = self.store.begin(menu_id).await?;
        let new_item = NewMenuItem {
            menu_id,
            parent_id,
            fields,
        };
        let result = insert_under(tx.as_mut(), new_item).await;
        let item = finish(tx, result).await?;

        info!("Created item {} in menu {}", item.id, menu_id);
        Ok(item)
    }

    /// Delete an item together with all of its descendants.
    ///
    /// Returns the deleted ids, the requested item first.
    pub async fn delete_item(&self, item_id: ItemId) -> Result<Vec<ItemId>, DomainError> {
        let item = self
            .store
            .find_item(item_id)
            .await?
            .ok_or(DomainError::ItemNotFound(item_id))?;

        let mut tx = self.store.begin(item.menu_id).await?;
        let result = delete_subtree(tx.as_mut(), item_id).await;
        if let Err(e) = &result {
            warn!("Deleting item {} failed: {}", item_id, e);
        }
        let deleted = finish(tx, result).await?;

        info!(
            "Deleted item {} and {} descendants from menu {}",
            item_id,
            deleted.len().saturating_sub(1),
            item.menu_id
        );
        Ok(deleted)
    }
}

async fn insert_under(
    tx: &mut dyn MenuTransaction,
    item: NewMenuItem,
) -> Result<MenuItem, DomainError> {
    if let Some(parent_id) = item.parent_id {
        if tx.find_item(parent_id).await?.is_none() {
            return Err(DomainError::ParentNotFound {
                menu_id: tx.menu_id(),
                parent_id,
            });
        }
    }
    tx.insert_item(&item).await
}

async fn delete_subtree(
    tx: &mut dyn MenuTransaction,
    item_id: ItemId,
) -> Result<Vec<ItemId>, DomainError> {
    // Re-read under the menu lock; a concurrent save may have removed it.
    let items = tx.list_items().await?;
    if !items.iter().any(|item| item.id == item_id) {
        return Err(DomainError::ItemNotFound(item_id));
    }

    let doomed = collect_subtree(&items, item_id);
    tx.delete_items(&doomed).await?;
    Ok(doomed)
}
