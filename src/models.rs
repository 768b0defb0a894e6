//! Core models for the ticklist library
//!
//! This module contains the core data types and business logic for the
//! ticklist tool: the task entity, the pure helpers that create, validate,
//! sort and summarize tasks, and the list controller that owns the one
//! in-memory collection.

use std::cmp::Reverse;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Inclusive lower bound on the trimmed description length.
pub const MIN_DESCRIPTION_LEN: usize = 1;

/// Inclusive upper bound on the trimmed description length.
pub const MAX_DESCRIPTION_LEN: usize = 200;

// Generated ids look like `task_<millis>_<suffix>`.
const ID_SUFFIX_LEN: usize = 7;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Why a proposed task description was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DescriptionError {
    #[error("Task description cannot be empty")]
    Empty,

    #[error("Task description is too long (max {} characters)", MAX_DESCRIPTION_LEN)]
    TooLong,
}

/// Checks a proposed description against the length bounds.
///
/// The input is trimmed first, so the bounds apply to what would actually be
/// stored. Returns which bound was violated; both bounds are inclusive.
pub fn validate_description(input: &str) -> Result<(), DescriptionError> {
    let len = input.trim().chars().count();

    if len < MIN_DESCRIPTION_LEN {
        return Err(DescriptionError::Empty);
    }

    if len > MAX_DESCRIPTION_LEN {
        return Err(DescriptionError::TooLong);
    }

    Ok(())
}

/// Produces an identifier for a new task.
///
/// Ids combine the wall-clock time at millisecond resolution with a short
/// lowercase-alphanumeric suffix, e.g. `task_1714070507123_k3f9a2q`.
/// Uniqueness is probabilistic rather than proven, which is plenty for a
/// single-user, single-session list; nothing here blocks.
pub fn generate_task_id(rng: &mut impl Rng, now: DateTime<Utc>) -> String {
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();

    format!("task_{}_{}", now.timestamp_millis(), suffix)
}

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: String,
    description: String,
    completed: bool,
    created_at: DateTime<Utc>,
}

impl Task {
    /// Builds a new task from an already-validated description.
    ///
    /// The description is trimmed before storing; the id is freshly generated
    /// and the task starts incomplete. Creation itself cannot fail, callers
    /// are expected to have run [`validate_description`] first (the list
    /// owner does exactly that). The clock and the randomness source are
    /// explicit arguments so tests can pin both.
    pub fn create(description: &str, now: DateTime<Utc>, rng: &mut impl Rng) -> Self {
        Self {
            id: generate_task_id(rng, now),
            description: description.trim().to_string(),
            completed: false,
            created_at: now,
        }
    }

    /// Gets the unique identifier of this task
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Gets the description of this task
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Checks if this task is completed
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Gets the creation timestamp of this task
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Flips the completion flag.
    pub(crate) fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

/// Orders tasks for display: incomplete before completed, newest first
/// within each group.
///
/// Returns a fresh vector and never mutates the input. Tasks with equal
/// `created_at` keep their input order (the sort is stable); sorting an
/// already-sorted sequence is therefore a no-op.
pub fn sort_tasks(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by_key(|task| (task.completed, Reverse(task.created_at)));
    sorted
}

/// Aggregate counts derived from a task collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub completion_percentage: u8,
}

/// Derives summary counts from a task collection.
///
/// The percentage is rounded to the nearest whole number and defined as zero
/// for an empty collection. Read-only and O(n), so it is safe to call on
/// every render.
pub fn compute_stats(tasks: &[Task]) -> TaskStats {
    let total = tasks.len();
    let completed = tasks.iter().filter(|task| task.completed).count();

    let completion_percentage = if total > 0 {
        ((completed as f64 / total as f64) * 100.0).round() as u8
    } else {
        0
    };

    TaskStats {
        total,
        completed,
        pending: total - completed,
        completion_percentage,
    }
}

/// The authoritative owner of a task collection.
///
/// Holds the tasks in display order together with the rng that feeds the id
/// generator. Every mutation goes through [`add`](Self::add),
/// [`toggle`](Self::toggle) or [`delete`](Self::delete); reads hand out
/// borrowed slices. Wall-clock time is always passed in by the caller, which
/// keeps the whole type deterministic under test.
pub struct TaskList {
    tasks: Vec<Task>,
    rng: StdRng,
}

impl Default for TaskList {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskList {
    /// Creates an empty list with an entropy-seeded id generator.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Creates an empty list with a caller-provided rng, for deterministic
    /// ids in tests.
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            tasks: Vec::new(),
            rng,
        }
    }

    // Mutations

    /// Validates and adds a task, returning the created task.
    ///
    /// On success the collection is resorted so active work surfaces first,
    /// newest first. On rejection the collection is untouched.
    pub fn add(&mut self, description: &str, now: DateTime<Utc>) -> Result<Task, DescriptionError> {
        validate_description(description)?;

        let task = Task::create(description, now, &mut self.rng);
        tracing::debug!(id = %task.id, "added task");

        self.tasks.push(task.clone());
        self.tasks = sort_tasks(&self.tasks);
        Ok(task)
    }

    /// Flips the completion flag of the task with the given id and resorts,
    /// returning the updated task. Returns `None` when no task matches; the
    /// collection is untouched in that case.
    pub fn toggle(&mut self, id: &str) -> Option<Task> {
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;
        task.toggle();
        let updated = task.clone();
        tracing::debug!(id, completed = updated.completed, "toggled task");

        self.tasks = sort_tasks(&self.tasks);
        Some(updated)
    }

    /// Removes the task with the given id, returning it, or `None` when no
    /// task matches. Removal preserves the relative order of the remaining
    /// tasks, so no resort happens.
    pub fn delete(&mut self, id: &str) -> Option<Task> {
        let position = self.tasks.iter().position(|task| task.id == id)?;
        let removed = self.tasks.remove(position);
        tracing::debug!(id, "deleted task");
        Some(removed)
    }

    // Reads

    /// The tasks in display order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Gets the task with the given id
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Derives summary counts for the current collection
    pub fn stats(&self) -> TaskStats {
        compute_stats(&self.tasks)
    }

    /// Number of tasks in the list
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Checks whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Shared handle over a [`TaskList`] with "collection changed" notifications.
///
/// This is the single writer the rest of the process talks to: mutations are
/// serialized through the inner mutex, stamped with the current wall-clock
/// time, and followed by a broadcast ping so observers know to re-read.
/// Clones share the same list.
#[derive(Clone)]
pub struct ListController {
    inner: Arc<Mutex<TaskList>>,
    update_tx: Arc<tokio::sync::broadcast::Sender<()>>,
}

impl ListController {
    /// Wraps a task list for shared use.
    pub fn new(list: TaskList) -> Self {
        // Capacity well above anything a single user produces between
        // observer reads; lagging receivers just resync from a snapshot.
        let (tx, _rx) = tokio::sync::broadcast::channel(100);

        Self {
            inner: Arc::new(Mutex::new(list)),
            update_tx: Arc::new(tx),
        }
    }

    // Helper to safely access the list and notify observers about state changes
    fn with_list<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut TaskList) -> R,
    {
        let mut list = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let result = f(&mut list);

        // Notify observers about state changes
        let _ = self.update_tx.send(());

        result
    }

    /// Validates and adds a task stamped with the current time.
    pub fn add(&self, description: &str) -> Result<Task, DescriptionError> {
        self.with_list(|list| list.add(description, Utc::now()))
    }

    /// Flips the completion flag of the task with the given id.
    pub fn toggle(&self, id: &str) -> Option<Task> {
        self.with_list(|list| list.toggle(id))
    }

    /// Removes the task with the given id.
    pub fn delete(&self, id: &str) -> Option<Task> {
        self.with_list(|list| list.delete(id))
    }

    /// A snapshot of the tasks in display order
    pub fn tasks(&self) -> Vec<Task> {
        let list = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        list.tasks().to_vec()
    }

    /// Summary counts for the current collection
    pub fn stats(&self) -> TaskStats {
        let list = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        list.stats()
    }

    // Subscribe to state updates
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<()> {
        self.update_tx.subscribe()
    }
}
