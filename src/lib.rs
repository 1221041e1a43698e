//! Tasklist: an ordered task list backed by `PostgreSQL`.
//!
//! The crate keeps a collection of tasks in a user-controlled presentation
//! order. Every ordering operation respects a unique, immediately checked
//! position column, so positions are only ever rewritten through
//! collision-free write sequences committed atomically.
//!
//! # Architecture
//!
//! Tasklist follows hexagonal architecture principles:
//!
//! - **Domain**: Validated task values and order-value planning
//! - **Ports**: The repository contract the store depends on
//! - **Adapters**: In-memory and `PostgreSQL` repositories
//!
//! # Modules
//!
//! - [`config`]: Environment-driven store configuration
//! - [`task`]: Task records and the ordered task store

pub mod config;
pub mod task;
