//! Application services maintaining the presentation order of tasks.

mod store;

pub use store::{
    OrderedTaskError, OrderedTaskErrorKind, OrderedTaskResult, OrderedTaskStore, SwapOutcome,
    TaskDetailsRequest,
};
