//! # Menu Infrastructure
//!
//! Storage adapters for the menu store port: PostgreSQL and in-memory.

pub mod database;
pub mod memory;

pub use database::{create_pool, run_migrations, PgMenuStore};
pub use memory::MemoryMenuStore;
