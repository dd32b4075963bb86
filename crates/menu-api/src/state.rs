use std::sync::Arc;

use menu_core::domain::TreeLimits;
use menu_core::repositories::MenuStore;
use menu_core::services::{ItemService, MenuService, MenuStructureService};

/// Shared handler state. Every service works on the same store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MenuStore>,
    pub menus: Arc<MenuService<dyn MenuStore>>,
    pub items: Arc<ItemService<dyn MenuStore>>,
    pub structure: Arc<MenuStructureService<dyn MenuStore>>,
}

impl AppState {
    pub fn new(store: Arc<dyn MenuStore>, limits: TreeLimits) -> Self {
        Self {
            menus: Arc::new(MenuService::new(store.clone())),
            items: Arc::new(ItemService::new(store.clone())),
            structure: Arc::new(MenuStructureService::new(store.clone(), limits)),
            store,
        }
    }
}
