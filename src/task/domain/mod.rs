//! Domain model for the ordered task list.
//!
//! The domain holds validated task values and the pure order-value
//! computation behind appends, adjacent moves and bulk reorders. All
//! persistence concerns stay outside of the domain boundary.

mod details;
mod error;
mod ids;
mod ordering;
mod task;

pub use details::{Cost, TaskDetails, TaskName};
pub use error::TaskDomainError;
pub use ids::{OrderPosition, TaskId};
pub use ordering::{MoveDirection, OrderingPolicy, PositionWrite, ReorderPlan, SwapPlan};
pub use task::{NewTask, PersistedTaskData, Task};
