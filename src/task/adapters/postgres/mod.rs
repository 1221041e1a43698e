//! `PostgreSQL` adapters for ordered task persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresTaskRepository, TaskPgPool, build_pool};
