//! In-memory adapters for the ordered task list.

mod task;

pub use task::InMemoryTaskRepository;
