//! # Menu Core - Domain Module
//! 
//! Domain entities for the menu builder.

pub mod menu;
pub mod menu_item;
pub mod item_node;

// Re-export all entities
pub use menu::{slugify, CreateMenu, Menu, MenuId, NewMenu, UpdateMenu};
pub use menu_item::{CreateMenuItem, ItemFields, ItemId, MenuItem, NewMenuItem};
pub use item_node::{build_tree, collect_item_ids, collect_subtree, ItemNode, TreeLimits};
