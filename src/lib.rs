//! Ticklist library crate
//!
//! This library provides the in-memory task list behind the ticklist tool:
//! task creation with validated descriptions, a fixed display ordering,
//! summary statistics and relative timestamps, plus the shared controller
//! the interactive session drives.

pub mod cli;
pub mod models;
pub mod timefmt;

// Re-export commonly used types
pub use models::{
    compute_stats, generate_task_id, sort_tasks, validate_description, DescriptionError,
    ListController, Task, TaskList, TaskStats, MAX_DESCRIPTION_LEN, MIN_DESCRIPTION_LEN,
};
pub use timefmt::format_relative;
