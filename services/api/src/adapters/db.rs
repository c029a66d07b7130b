//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use exercise_tracker_core::domain::{
    Exercise, ExerciseQuery, ExerciseSummary, Log, NewExercise, User,
};
use exercise_tracker_core::ports::{DatabaseService, PortError, PortResult};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn to_i32(value: usize, what: &str) -> PortResult<i32> {
    i32::try_from(value).map_err(|_| PortError::Unexpected(format!("{} {} out of range", what, value)))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    username: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            username: self.username,
        }
    }
}

#[derive(FromRow)]
struct ExerciseRecord {
    id: Uuid,
    user_id: Uuid,
    username: String,
    description: String,
    duration: f64,
    date: Option<DateTime<Utc>>,
}
impl ExerciseRecord {
    fn to_domain(self) -> Exercise {
        Exercise {
            id: self.id,
            user_id: self.user_id,
            username: self.username,
            description: self.description,
            duration: self.duration,
            date: self.date,
        }
    }
}

#[derive(FromRow)]
struct SummaryRecord {
    description: String,
    duration: f64,
    date: Option<DateTime<Utc>>,
}
impl SummaryRecord {
    fn to_domain(self) -> ExerciseSummary {
        ExerciseSummary {
            description: self.description,
            duration: self.duration,
            date: self.date,
        }
    }
}

/// One element of the `logs.log` JSONB array.
#[derive(Serialize, Deserialize)]
struct LogEntryDocument {
    description: String,
    duration: f64,
    date: Option<DateTime<Utc>>,
}
impl From<ExerciseSummary> for LogEntryDocument {
    fn from(summary: ExerciseSummary) -> Self {
        Self {
            description: summary.description,
            duration: summary.duration,
            date: summary.date,
        }
    }
}

#[derive(FromRow)]
struct LogRecord {
    user_id: Uuid,
    username: String,
    count: i32,
    log: Json<Vec<LogEntryDocument>>,
}
impl LogRecord {
    fn to_domain(self) -> Log {
        Log {
            user_id: self.user_id,
            username: self.username,
            count: self.count.max(0) as usize,
            log: self
                .log
                .0
                .into_iter()
                .map(|entry| ExerciseSummary {
                    description: entry.description,
                    duration: entry.duration,
                    date: entry.date,
                })
                .collect(),
        }
    }
}

fn to_documents(entries: Vec<ExerciseSummary>) -> Json<Vec<LogEntryDocument>> {
    Json(entries.into_iter().map(LogEntryDocument::from).collect())
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(&self, username: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, username) VALUES ($1, $2) RETURNING id, username",
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let record =
            sqlx::query_as::<_, UserRecord>("SELECT id, username FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| match e {
                    sqlx::Error::RowNotFound => {
                        PortError::NotFound(format!("User {} not found", user_id))
                    }
                    _ => unexpected(e),
                })?;
        Ok(record.to_domain())
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        let records =
            sqlx::query_as::<_, UserRecord>("SELECT id, username FROM users ORDER BY seq ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_exercise(&self, exercise: NewExercise) -> PortResult<Exercise> {
        let record = sqlx::query_as::<_, ExerciseRecord>(
            "INSERT INTO exercises (id, user_id, username, description, duration, date) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, user_id, username, description, duration, date",
        )
        .bind(Uuid::new_v4())
        .bind(exercise.user_id)
        .bind(&exercise.username)
        .bind(&exercise.description)
        .bind(exercise.duration)
        .bind(exercise.date)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_exercises_for_user(&self, user_id: Uuid) -> PortResult<Vec<Exercise>> {
        let records = sqlx::query_as::<_, ExerciseRecord>(
            "SELECT id, user_id, username, description, duration, date \
             FROM exercises WHERE user_id = $1 ORDER BY seq ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn find_exercises(&self, query: &ExerciseQuery) -> PortResult<Vec<ExerciseSummary>> {
        // LIMIT NULL is LIMIT ALL in PostgreSQL.
        let limit = query.limit.map(|n| i64::try_from(n).unwrap_or(i64::MAX));
        let records = sqlx::query_as::<_, SummaryRecord>(
            "SELECT description, duration, date FROM exercises \
             WHERE user_id = $1 AND date >= $2 AND date <= $3 \
             ORDER BY seq ASC LIMIT $4",
        )
        .bind(query.user_id)
        .bind(query.from)
        .bind(query.to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_log(&self, user_id: Uuid) -> PortResult<Option<Log>> {
        let record = sqlx::query_as::<_, LogRecord>(
            "SELECT user_id, username, count, log FROM logs WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn create_log(&self, log: Log) -> PortResult<()> {
        // Two first reads for the same user may race here; the later one wins.
        sqlx::query(
            "INSERT INTO logs (user_id, username, count, log) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id) DO UPDATE \
             SET username = EXCLUDED.username, count = EXCLUDED.count, log = EXCLUDED.log",
        )
        .bind(log.user_id)
        .bind(&log.username)
        .bind(to_i32(log.count, "count")?)
        .bind(to_documents(log.log))
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn update_log(
        &self,
        user_id: Uuid,
        count: usize,
        entries: Vec<ExerciseSummary>,
    ) -> PortResult<()> {
        let result = sqlx::query("UPDATE logs SET count = $1, log = $2 WHERE user_id = $3")
            .bind(to_i32(count, "count")?)
            .bind(to_documents(entries))
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Log for user {} not found", user_id)));
        }
        Ok(())
    }
}
