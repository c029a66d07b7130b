//! crates/exercise_tracker_core/src/tracker.rs
//!
//! The application operations. Each one validates its input, talks to the
//! storage port and returns domain values; rendering is left to the caller.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::dates::{normalize_date, parse_date};
use crate::domain::{Exercise, ExerciseLog, ExerciseQuery, ExerciseSummary, Log, NewExercise, User};
use crate::ports::{DatabaseService, PortError, PortResult};
use crate::validation::{require_duration, require_text, ValidationError};

/// Everything that can go wrong in a tracker operation.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("user does not exist")]
    UserNotFound,
    #[error(transparent)]
    Port(#[from] PortError),
}

/// Raw exercise fields as received from a client.
#[derive(Debug, Clone, Default)]
pub struct ExerciseInput {
    pub description: Option<String>,
    pub duration: Option<String>,
    pub date: Option<String>,
}

/// Raw range filter for a log request.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<String>,
}

/// What a cache refresh did to the stored log document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheRefresh {
    Created,
    Updated,
    Unchanged,
}

pub async fn create_user(
    db: &dyn DatabaseService,
    username: Option<&str>,
) -> Result<User, TrackerError> {
    let username = require_text("username", username)?;
    let user = db.create_user(username).await?;
    debug!(user_id = %user.id, "created user");
    Ok(user)
}

pub async fn list_users(db: &dyn DatabaseService) -> Result<Vec<User>, TrackerError> {
    Ok(db.list_users().await?)
}

/// Validates and stores a new exercise for the user identified by `user_id`.
///
/// A date that cannot be parsed is stored as `None` rather than rejected.
pub async fn log_exercise(
    db: &dyn DatabaseService,
    user_id: &str,
    input: &ExerciseInput,
    now: DateTime<Utc>,
) -> Result<Exercise, TrackerError> {
    let description = require_text("description", input.description.as_deref())?;
    let duration = require_duration(input.duration.as_deref())?;
    let user = find_user(db, user_id).await?;

    let date = normalize_date(input.date.as_deref(), now);
    if date.is_none() {
        warn!(user_id = %user.id, raw = ?input.date, "unparseable exercise date, storing without one");
    }

    let exercise = db
        .create_exercise(NewExercise {
            user_id: user.id,
            username: user.username,
            description: description.to_string(),
            duration,
            date,
        })
        .await?;
    debug!(exercise_id = %exercise.id, user_id = %exercise.user_id, "logged exercise");
    Ok(exercise)
}

/// Returns the user's exercises inside the requested window.
///
/// The stored log cache is refreshed from the full exercise set first; a
/// failed refresh is logged and otherwise ignored.
pub async fn exercise_log(
    db: &dyn DatabaseService,
    user_id: &str,
    filter: &LogFilter,
    now: DateTime<Utc>,
) -> Result<ExerciseLog, TrackerError> {
    let user = find_user(db, user_id).await?;

    match refresh_log_cache(db, &user).await {
        Ok(outcome) => debug!(user_id = %user.id, ?outcome, "log cache refreshed"),
        Err(e) => warn!(user_id = %user.id, error = %e, "failed to refresh log cache"),
    }

    let from = filter.from.as_deref().and_then(parse_date);
    let to = filter.to.as_deref().and_then(parse_date);
    let query = ExerciseQuery {
        user_id: user.id,
        from: from.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        to: to.unwrap_or(now),
        limit: parse_limit(filter.limit.as_deref()),
    };

    let entries = db.find_exercises(&query).await?;
    Ok(ExerciseLog {
        user,
        from,
        to,
        entries,
    })
}

/// Recomputes the cached log document from every exercise of the user.
///
/// Creates the document when missing and overwrites it when its count is
/// stale. Equal counts are trusted and left alone.
pub async fn refresh_log_cache(db: &dyn DatabaseService, user: &User) -> PortResult<CacheRefresh> {
    let entries: Vec<ExerciseSummary> = db
        .get_exercises_for_user(user.id)
        .await?
        .iter()
        .map(ExerciseSummary::from)
        .collect();
    let count = entries.len();

    match db.get_log(user.id).await? {
        Some(cached) if cached.count == count => Ok(CacheRefresh::Unchanged),
        Some(_) => {
            db.update_log(user.id, count, entries).await?;
            Ok(CacheRefresh::Updated)
        }
        None => {
            db.create_log(Log {
                user_id: user.id,
                username: user.username.clone(),
                count,
                log: entries,
            })
            .await?;
            Ok(CacheRefresh::Created)
        }
    }
}

/// Interprets the `limit` query parameter. Zero, absent or garbage means no
/// limit; a negative value counts as its magnitude.
pub fn parse_limit(raw: Option<&str>) -> Option<usize> {
    let limit = raw?.trim().parse::<i64>().ok()?;
    match limit.unsigned_abs() {
        0 => None,
        n => usize::try_from(n).ok(),
    }
}

async fn find_user(db: &dyn DatabaseService, user_id: &str) -> Result<User, TrackerError> {
    let id = Uuid::parse_str(user_id.trim()).map_err(|_| TrackerError::UserNotFound)?;
    db.get_user_by_id(id).await.map_err(|e| match e {
        PortError::NotFound(_) => TrackerError::UserNotFound,
        other => TrackerError::Port(other),
    })
}
