//! Persistence layer: PostgreSQL pool, entities and repositories.

pub mod db;
pub mod entities;
pub mod repositories;

pub use db::{create_pool, DatabaseConfig};
