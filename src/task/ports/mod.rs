//! Port contracts for the ordered task list.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod repository;

#[cfg(test)]
pub use repository::MockTaskRepository;
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
