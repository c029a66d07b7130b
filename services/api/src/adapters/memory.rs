//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of the `DatabaseService` port. Records live in
//! insertion-ordered vectors behind a single lock; nothing is persisted.

use async_trait::async_trait;
use exercise_tracker_core::domain::{
    Exercise, ExerciseQuery, ExerciseSummary, Log, NewExercise, User,
};
use exercise_tracker_core::ports::{DatabaseService, PortError, PortResult};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    exercises: Vec<Exercise>,
    logs: Vec<Log>,
}

/// A `DatabaseService` that keeps everything in memory.
#[derive(Default)]
pub struct InMemoryDb {
    tables: RwLock<Tables>,
}

impl InMemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored exercises across all users.
    pub async fn exercise_count(&self) -> usize {
        self.tables.read().await.exercises.len()
    }
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn create_user(&self, username: &str) -> PortResult<User> {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
        };
        self.tables.write().await.users.push(user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        self.tables
            .read()
            .await
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        Ok(self.tables.read().await.users.clone())
    }

    async fn create_exercise(&self, exercise: NewExercise) -> PortResult<Exercise> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == exercise.user_id) {
            return Err(PortError::NotFound(format!(
                "User {} not found",
                exercise.user_id
            )));
        }
        let stored = Exercise {
            id: Uuid::new_v4(),
            user_id: exercise.user_id,
            username: exercise.username,
            description: exercise.description,
            duration: exercise.duration,
            date: exercise.date,
        };
        tables.exercises.push(stored.clone());
        Ok(stored)
    }

    async fn get_exercises_for_user(&self, user_id: Uuid) -> PortResult<Vec<Exercise>> {
        Ok(self
            .tables
            .read()
            .await
            .exercises
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_exercises(&self, query: &ExerciseQuery) -> PortResult<Vec<ExerciseSummary>> {
        let tables = self.tables.read().await;
        let matching = tables
            .exercises
            .iter()
            .filter(|e| e.user_id == query.user_id && query.matches(e.date))
            .map(ExerciseSummary::from);
        Ok(match query.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }

    async fn get_log(&self, user_id: Uuid) -> PortResult<Option<Log>> {
        Ok(self
            .tables
            .read()
            .await
            .logs
            .iter()
            .find(|l| l.user_id == user_id)
            .cloned())
    }

    async fn create_log(&self, log: Log) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        match tables.logs.iter_mut().find(|l| l.user_id == log.user_id) {
            Some(existing) => *existing = log,
            None => tables.logs.push(log),
        }
        Ok(())
    }

    async fn update_log(
        &self,
        user_id: Uuid,
        count: usize,
        entries: Vec<ExerciseSummary>,
    ) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        let log = tables
            .logs
            .iter_mut()
            .find(|l| l.user_id == user_id)
            .ok_or_else(|| PortError::NotFound(format!("Log for user {} not found", user_id)))?;
        log.count = count;
        log.log = entries;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, d, 0, 0, 0).unwrap()
    }

    async fn seed(db: &InMemoryDb, user: &User, dates: &[Option<DateTime<Utc>>]) {
        for (i, date) in dates.iter().enumerate() {
            db.create_exercise(NewExercise {
                user_id: user.id,
                username: user.username.clone(),
                description: format!("exercise {}", i),
                duration: 10.0,
                date: *date,
            })
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let db = InMemoryDb::new();
        let err = db.get_user_by_id(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_users_listed_in_creation_order() {
        let db = InMemoryDb::new();
        db.create_user("a").await.unwrap();
        db.create_user("b").await.unwrap();
        let names: Vec<String> = db.list_users().await.unwrap().into_iter().map(|u| u.username).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[tokio::test]
    async fn test_find_exercises_is_inclusive_and_skips_missing_dates() {
        let db = InMemoryDb::new();
        let user = db.create_user("alice").await.unwrap();
        seed(&db, &user, &[Some(day(1)), Some(day(5)), None, Some(day(10))]).await;

        let found = db
            .find_exercises(&ExerciseQuery {
                user_id: user.id,
                from: day(5),
                to: day(10),
                limit: None,
            })
            .await
            .unwrap();

        let descriptions: Vec<&str> = found.iter().map(|s| s.description.as_str()).collect();
        assert_eq!(descriptions, ["exercise 1", "exercise 3"]);
    }

    #[tokio::test]
    async fn test_find_exercises_applies_limit_in_insertion_order() {
        let db = InMemoryDb::new();
        let user = db.create_user("alice").await.unwrap();
        seed(&db, &user, &[Some(day(3)), Some(day(1)), Some(day(2))]).await;

        let found = db
            .find_exercises(&ExerciseQuery {
                user_id: user.id,
                from: day(1),
                to: day(31),
                limit: Some(2),
            })
            .await
            .unwrap();

        let dates: Vec<_> = found.iter().map(|s| s.date).collect();
        assert_eq!(dates, [Some(day(3)), Some(day(1))]);
    }

    #[tokio::test]
    async fn test_create_log_replaces_existing_document() {
        let db = InMemoryDb::new();
        let user = db.create_user("alice").await.unwrap();
        let entry = ExerciseSummary {
            description: "run".to_string(),
            duration: 2.5,
            date: Some(day(1)),
        };

        for count in [0, 1] {
            db.create_log(Log {
                user_id: user.id,
                username: user.username.clone(),
                count,
                log: vec![entry.clone(); count],
            })
            .await
            .unwrap();
        }

        let log = db.get_log(user.id).await.unwrap().unwrap();
        assert_eq!(log.count, 1);
        assert_eq!(log.log, vec![entry]);
        assert_eq!(db.tables.read().await.logs.len(), 1);
    }

    #[tokio::test]
    async fn test_update_log_requires_existing_document() {
        let db = InMemoryDb::new();
        let err = db.update_log(Uuid::new_v4(), 0, vec![]).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }
}
