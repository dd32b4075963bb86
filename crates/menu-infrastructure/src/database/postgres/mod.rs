//! PostgreSQL repository implementations

pub mod menu_store_impl;

pub use menu_store_impl::PgMenuStore;
