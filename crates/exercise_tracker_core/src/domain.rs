//! crates/exercise_tracker_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A registered user. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
}

/// A single logged exercise.
///
/// `username` is copied from the owning user at creation time so the read
/// paths never need a join. `date` is `None` when the client sent a date
/// that could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub description: String,
    pub duration: f64,
    pub date: Option<DateTime<Utc>>,
}

/// An exercise that has passed validation but has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExercise {
    pub user_id: Uuid,
    pub username: String,
    pub description: String,
    pub duration: f64,
    pub date: Option<DateTime<Utc>>,
}

// The projection used by both the log cache and the log endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseSummary {
    pub description: String,
    pub duration: f64,
    pub date: Option<DateTime<Utc>>,
}

impl From<&Exercise> for ExerciseSummary {
    fn from(exercise: &Exercise) -> Self {
        Self {
            description: exercise.description.clone(),
            duration: exercise.duration,
            date: exercise.date,
        }
    }
}

/// The cached per-user aggregate of all exercises.
///
/// Derived data: it can always be rebuilt from the exercise store.
#[derive(Debug, Clone, PartialEq)]
pub struct Log {
    pub user_id: Uuid,
    pub username: String,
    pub count: usize,
    pub log: Vec<ExerciseSummary>,
}

/// A range query over one user's exercises. Both bounds are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseQuery {
    pub user_id: Uuid,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// `None` means unbounded.
    pub limit: Option<usize>,
}

impl ExerciseQuery {
    /// Whether a stored date falls inside the query window.
    /// Exercises without a date never match.
    pub fn matches(&self, date: Option<DateTime<Utc>>) -> bool {
        date.is_some_and(|d| d >= self.from && d <= self.to)
    }
}

/// The filtered log returned to clients.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseLog {
    pub user: User,
    /// Present only when the client supplied a parseable lower bound.
    pub from: Option<DateTime<Utc>>,
    /// Present only when the client supplied a parseable upper bound.
    pub to: Option<DateTime<Utc>>,
    pub entries: Vec<ExerciseSummary>,
}

impl ExerciseLog {
    pub fn count(&self) -> usize {
        self.entries.len()
    }
}
