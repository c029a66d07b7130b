//! crates/exercise_tracker_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! The storage port forms the boundary of the hexagonal architecture, allowing
//! the core to be independent of a specific database.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Exercise, ExerciseQuery, ExerciseSummary, Log, NewExercise, User};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the underlying store.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Users ---
    async fn create_user(&self, username: &str) -> PortResult<User>;

    /// Returns `PortError::NotFound` when no user has this id.
    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    /// All users, in creation order.
    async fn list_users(&self) -> PortResult<Vec<User>>;

    // --- Exercises ---
    async fn create_exercise(&self, exercise: NewExercise) -> PortResult<Exercise>;

    /// Every exercise of the user in insertion order, unfiltered.
    async fn get_exercises_for_user(&self, user_id: Uuid) -> PortResult<Vec<Exercise>>;

    /// Exercises of the user whose date lies in the query window, in insertion
    /// order, truncated to the query limit.
    async fn find_exercises(&self, query: &ExerciseQuery) -> PortResult<Vec<ExerciseSummary>>;

    // --- Log cache ---
    async fn get_log(&self, user_id: Uuid) -> PortResult<Option<Log>>;

    /// Stores a cache document, replacing any existing one for the same user.
    async fn create_log(&self, log: Log) -> PortResult<()>;

    /// Overwrites `count` and `log` of an existing cache document.
    async fn update_log(
        &self,
        user_id: Uuid,
        count: usize,
        entries: Vec<ExerciseSummary>,
    ) -> PortResult<()>;
}
