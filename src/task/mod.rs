//! Ordered task list management.
//!
//! Tasks carry a name, a cost, a due date and a unique presentation
//! position. New tasks land at the end of the list; adjacent moves and bulk
//! reorders rewrite positions through de-collision values so the unique
//! position constraint holds after every statement. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
