//! Menu store traits (port)

use async_trait::async_trait;

use crate::domain::{ItemId, Menu, MenuId, MenuItem, NewMenu, NewMenuItem};
use crate::error::DomainError;

/// Read access plus menu-scoped write transactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MenuStore: Send + Sync {
    async fn ping(&self) -> Result<(), DomainError>;

    async fn list_menus(&self) -> Result<Vec<Menu>, DomainError>;
    async fn find_menu(&self, id: MenuId) -> Result<Option<Menu>, DomainError>;
    async fn create_menu(&self, menu: &NewMenu) -> Result<Menu, DomainError>;
    async fn update_menu(&self, menu: &Menu) -> Result<Menu, DomainError>;

    /// All items of a menu, in no particular order.
    async fn list_items(&self, menu_id: MenuId) -> Result<Vec<MenuItem>, DomainError>;
    async fn find_item(&self, id: ItemId) -> Result<Option<MenuItem>, DomainError>;

    /// Open a write transaction on one menu.
    ///
    /// The transaction holds the menu's write lock until it is committed,
    /// rolled back or dropped; dropping without commit discards every write.
    /// Fails with `MenuNotFound` when the menu does not exist.
    async fn begin(&self, menu_id: MenuId) -> Result<Box<dyn MenuTransaction>, DomainError>;
}

/// Writes scoped to the menu a transaction was opened on.
#[async_trait]
pub trait MenuTransaction: Send {
    fn menu_id(&self) -> MenuId;

    async fn list_items(&mut self) -> Result<Vec<MenuItem>, DomainError>;

    /// Looks the item up within this menu only.
    async fn find_item(&mut self, id: ItemId) -> Result<Option<MenuItem>, DomainError>;

    async fn insert_item(&mut self, item: &NewMenuItem) -> Result<MenuItem, DomainError>;
    async fn update_item(&mut self, item: &MenuItem) -> Result<MenuItem, DomainError>;

    /// Delete exactly the given rows. Descendants are not removed implicitly;
    /// deleting a parent whose children survive is an error.
    async fn delete_items(&mut self, ids: &[ItemId]) -> Result<u64, DomainError>;

    /// Delete the menu row. Its items must already be gone.
    async fn delete_menu(&mut self) -> Result<(), DomainError>;

    async fn commit(self: Box<Self>) -> Result<(), DomainError>;
    async fn rollback(self: Box<Self>) -> Result<(), DomainError>;
}
