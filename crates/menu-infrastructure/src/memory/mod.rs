//! In-memory menu store.
//!
//! Used for local development without a database and by the integration
//! tests. It enforces the same integrity rules as the PostgreSQL schema:
//! unique menu names and slugs, parents inside the same menu and no orphaned
//! children.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use menu_core::domain::{ItemId, Menu, MenuId, MenuItem, NewMenu, NewMenuItem};
use menu_core::error::DomainError;
use menu_core::repositories::{MenuStore, MenuTransaction};

#[derive(Debug, Clone, Default)]
struct State {
    last_menu_id: MenuId,
    last_item_id: ItemId,
    menus: BTreeMap<MenuId, Menu>,
    items: BTreeMap<ItemId, MenuItem>,
}

impl State {
    fn check_unique(&self, menu_id: MenuId, name: &str, slug: &str) -> Result<(), DomainError> {
        let others = self.menus.values().filter(|m| m.id != menu_id);
        for other in others {
            if other.name == name {
                return Err(DomainError::MenuNameAlreadyExists(name.to_string()));
            }
            if other.slug == slug {
                return Err(DomainError::MenuSlugAlreadyExists(slug.to_string()));
            }
        }
        Ok(())
    }

    fn item_in_menu(&self, menu_id: MenuId, id: ItemId) -> Option<&MenuItem> {
        self.items.get(&id).filter(|item| item.menu_id == menu_id)
    }

    fn check_parent(&self, menu_id: MenuId, parent_id: Option<ItemId>) -> Result<(), DomainError> {
        match parent_id {
            Some(parent_id) if self.item_in_menu(menu_id, parent_id).is_none() => {
                Err(DomainError::ParentNotFound { menu_id, parent_id })
            }
            _ => Ok(()),
        }
    }
}

/// Menu store kept in process memory.
///
/// Write transactions take a store-wide lock and work on a copy of the data
/// that replaces the shared state on commit.
#[derive(Clone)]
pub struct MemoryMenuStore {
    state: Arc<Mutex<State>>,
    fail_after: Arc<AtomicUsize>,
}

impl Default for MemoryMenuStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMenuStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            fail_after: Arc::new(AtomicUsize::new(usize::MAX)),
        }
    }

    /// Make the next transaction fail on its `writes + 1`-th write.
    pub fn fail_after_writes(&self, writes: usize) {
        self.fail_after.store(writes, Ordering::SeqCst);
    }
}

#[async_trait]
impl MenuStore for MemoryMenuStore {
    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }

    async fn list_menus(&self) -> Result<Vec<Menu>, DomainError> {
        let state = self.state.lock().await;
        let mut menus: Vec<Menu> = state.menus.values().cloned().collect();
        menus.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(menus)
    }

    async fn find_menu(&self, id: MenuId) -> Result<Option<Menu>, DomainError> {
        Ok(self.state.lock().await.menus.get(&id).cloned())
    }

    async fn create_menu(&self, menu: &NewMenu) -> Result<Menu, DomainError> {
        let mut state = self.state.lock().await;
        state.check_unique(0, &menu.name, &menu.slug)?;

        state.last_menu_id += 1;
        let now = Utc::now();
        let created = Menu {
            id: state.last_menu_id,
            name: menu.name.clone(),
            slug: menu.slug.clone(),
            description: menu.description.clone(),
            is_active: menu.is_active,
            created_at: now,
            updated_at: now,
        };
        state.menus.insert(created.id, created.clone());

        info!("Menu created successfully: {}", created.id);
        Ok(created)
    }

    async fn update_menu(&self, menu: &Menu) -> Result<Menu, DomainError> {
        let mut state = self.state.lock().await;
        if !state.menus.contains_key(&menu.id) {
            return Err(DomainError::MenuNotFound(menu.id));
        }
        state.check_unique(menu.id, &menu.name, &menu.slug)?;

        state.menus.insert(menu.id, menu.clone());
        Ok(menu.clone())
    }

    async fn list_items(&self, menu_id: MenuId) -> Result<Vec<MenuItem>, DomainError> {
        let state = self.state.lock().await;
        Ok(state
            .items
            .values()
            .filter(|item| item.menu_id == menu_id)
            .cloned()
            .collect())
    }

    async fn find_item(&self, id: ItemId) -> Result<Option<MenuItem>, DomainError> {
        Ok(self.state.lock().await.items.get(&id).cloned())
    }

    async fn begin(&self, menu_id: MenuId) -> Result<Box<dyn MenuTransaction>, DomainError> {
        let guard = self.state.clone().lock_owned().await;
        if !guard.menus.contains_key(&menu_id) {
            return Err(DomainError::MenuNotFound(menu_id));
        }

        debug!("Locked menu {} for writing", menu_id);
        Ok(Box::new(MemoryMenuTransaction {
            menu_id,
            working: (*guard).clone(),
            guard,
            writes_left: self.fail_after.swap(usize::MAX, Ordering::SeqCst),
        }))
    }
}

pub struct MemoryMenuTransaction {
    menu_id: MenuId,
    guard: OwnedMutexGuard<State>,
    working: State,
    writes_left: usize,
}

impl MemoryMenuTransaction {
    fn spend_write(&mut self) -> Result<(), DomainError> {
        if self.writes_left == 0 {
            return Err(DomainError::DatabaseError("injected write failure".to_string()));
        }
        if self.writes_left != usize::MAX {
            self.writes_left -= 1;
        }
        Ok(())
    }
}

#[async_trait]
impl MenuTransaction for MemoryMenuTransaction {
    fn menu_id(&self) -> MenuId {
        self.menu_id
    }

    async fn list_items(&mut self) -> Result<Vec<MenuItem>, DomainError> {
        let menu_id = self.menu_id;
        Ok(self
            .working
            .items
            .values()
            .filter(|item| item.menu_id == menu_id)
            .cloned()
            .collect())
    }

    async fn find_item(&mut self, id: ItemId) -> Result<Option<MenuItem>, DomainError> {
        Ok(self.working.item_in_menu(self.menu_id, id).cloned())
    }

    async fn insert_item(&mut self, item: &NewMenuItem) -> Result<MenuItem, DomainError> {
        self.spend_write()?;
        self.working.check_parent(self.menu_id, item.parent_id)?;

        self.working.last_item_id += 1;
        let now = Utc::now();
        let created = MenuItem {
            id: self.working.last_item_id,
            menu_id: self.menu_id,
            parent_id: item.parent_id,
            title: item.fields.title.clone(),
            url: item.fields.url.clone(),
            order: item.fields.order,
            is_external: item.fields.is_external,
            css_class: item.fields.css_class.clone(),
            icon: item.fields.icon.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.working.items.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_item(&mut self, item: &MenuItem) -> Result<MenuItem, DomainError> {
        self.spend_write()?;
        let Some(stored) = self.working.item_in_menu(self.menu_id, item.id) else {
            return Err(DomainError::ItemNotFound(item.id));
        };
        if item.parent_id == Some(item.id) {
            return Err(DomainError::ValidationError(format!(
                "Item {} cannot be its own parent",
                item.id
            )));
        }
        self.working.check_parent(self.menu_id, item.parent_id)?;

        let updated = MenuItem {
            menu_id: self.menu_id,
            created_at: stored.created_at,
            ..item.clone()
        };
        self.working.items.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete_items(&mut self, ids: &[ItemId]) -> Result<u64, DomainError> {
        self.spend_write()?;
        let menu_id = self.menu_id;
        let doomed: HashSet<ItemId> = ids
            .iter()
            .copied()
            .filter(|id| self.working.item_in_menu(menu_id, *id).is_some())
            .collect();

        let orphan = self.working.items.values().find(|item| {
            !doomed.contains(&item.id)
                && item.parent_id.is_some_and(|parent_id| doomed.contains(&parent_id))
        });
        if let Some(orphan) = orphan {
            return Err(DomainError::DatabaseError(format!(
                "deleting items would orphan item {}",
                orphan.id
            )));
        }

        self.working.items.retain(|id, _| !doomed.contains(id));
        Ok(doomed.len() as u64)
    }

    async fn delete_menu(&mut self) -> Result<(), DomainError> {
        self.spend_write()?;
        let menu_id = self.menu_id;
        if self.working.items.values().any(|item| item.menu_id == menu_id) {
            return Err(DomainError::DatabaseError(format!(
                "menu {} still has items",
                menu_id
            )));
        }
        self.working.menus.remove(&menu_id);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let MemoryMenuTransaction {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        debug!("Discarding changes to menu {}", self.menu_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use menu_core::domain::ItemFields;

    fn new_menu(name: &str, slug: &str) -> NewMenu {
        NewMenu {
            name: name.to_string(),
            slug: slug.to_string(),
            description: String::new(),
            is_active: true,
        }
    }

    fn new_item(menu_id: MenuId, parent_id: Option<ItemId>, title: &str) -> NewMenuItem {
        NewMenuItem {
            menu_id,
            parent_id,
            fields: ItemFields {
                title: title.to_string(),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let store = MemoryMenuStore::new();
        store.create_menu(&new_menu("Main", "main")).await.unwrap();

        let err = store.create_menu(&new_menu("Other", "main")).await.unwrap_err();
        assert!(matches!(err, DomainError::MenuSlugAlreadyExists(_)));

        let err = store.create_menu(&new_menu("Main", "other")).await.unwrap_err();
        assert!(matches!(err, DomainError::MenuNameAlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_writes() {
        let store = MemoryMenuStore::new();
        let menu = store.create_menu(&new_menu("Main", "main")).await.unwrap();

        {
            let mut tx = store.begin(menu.id).await.unwrap();
            tx.insert_item(&new_item(menu.id, None, "Home")).await.unwrap();
        }

        assert!(store.list_items(menu.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commit_publishes_writes() {
        let store = MemoryMenuStore::new();
        let menu = store.create_menu(&new_menu("Main", "main")).await.unwrap();

        let mut tx = store.begin(menu.id).await.unwrap();
        let home = tx.insert_item(&new_item(menu.id, None, "Home")).await.unwrap();
        tx.insert_item(&new_item(menu.id, Some(home.id), "News")).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.list_items(menu.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_parent_must_share_menu() {
        let store = MemoryMenuStore::new();
        let main = store.create_menu(&new_menu("Main", "main")).await.unwrap();
        let footer = store.create_menu(&new_menu("Footer", "footer")).await.unwrap();

        let mut tx = store.begin(main.id).await.unwrap();
        let home = tx.insert_item(&new_item(main.id, None, "Home")).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin(footer.id).await.unwrap();
        let err = tx
            .insert_item(&new_item(footer.id, Some(home.id), "Legal"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ParentNotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_refuses_to_orphan_children() {
        let store = MemoryMenuStore::new();
        let menu = store.create_menu(&new_menu("Main", "main")).await.unwrap();

        let mut tx = store.begin(menu.id).await.unwrap();
        let home = tx.insert_item(&new_item(menu.id, None, "Home")).await.unwrap();
        let news = tx.insert_item(&new_item(menu.id, Some(home.id), "News")).await.unwrap();

        assert!(tx.delete_items(&[home.id]).await.is_err());
        assert_eq!(tx.delete_items(&[home.id, news.id]).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_injected_failure_hits_next_transaction_only() {
        let store = MemoryMenuStore::new();
        let menu = store.create_menu(&new_menu("Main", "main")).await.unwrap();
        store.fail_after_writes(1);

        let mut tx = store.begin(menu.id).await.unwrap();
        tx.insert_item(&new_item(menu.id, None, "Home")).await.unwrap();
        assert!(tx.insert_item(&new_item(menu.id, None, "About")).await.is_err());
        tx.rollback().await.unwrap();

        let mut tx = store.begin(menu.id).await.unwrap();
        tx.insert_item(&new_item(menu.id, None, "Home")).await.unwrap();
        tx.insert_item(&new_item(menu.id, None, "About")).await.unwrap();
        tx.commit().await.unwrap();
    }
}
