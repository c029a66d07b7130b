//! services/api/src/web/protocol.rs
//!
//! Defines the JSON/form payloads exchanged between clients and the REST API.
//!
//! Incoming fields are all kept as optional strings so that a missing field, an
//! empty field and a malformed field can be reported separately by the core.

use std::fmt;

use exercise_tracker_core::dates::to_date_string;
use exercise_tracker_core::domain::{Exercise, ExerciseLog, ExerciseSummary, User};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

//=========================================================================================
// Payloads Sent FROM the Client TO the Server
//=========================================================================================

/// Body of `POST /api/users`.
#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct CreateUserRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub username: Option<String>,
}

/// Body of `POST /api/users/{user_id}/exercises`.
#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct CreateExerciseRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    /// Minutes, at least 1; a JSON number or a numeric string.
    #[serde(default, deserialize_with = "lenient_string")]
    pub duration: Option<String>,
    /// Any parseable date, or epoch milliseconds. Defaults to now.
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
}

/// Query string of `GET /api/users/{user_id}/logs`.
#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LogQuery {
    /// Inclusive lower bound of the exercise date.
    pub from: Option<String>,
    /// Inclusive upper bound of the exercise date.
    pub to: Option<String>,
    /// Maximum number of entries; 0 or absent means unbounded.
    pub limit: Option<String>,
}

//=========================================================================================
// Payloads Sent FROM the Server TO the Client
//=========================================================================================

#[derive(Serialize, Debug, ToSchema)]
pub struct UserResponse {
    pub username: String,
    pub id: Uuid,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            id: user.id,
        }
    }
}

/// A freshly logged exercise. `id` is the owning user's id.
#[derive(Serialize, Debug, ToSchema)]
pub struct ExerciseResponse {
    pub id: Uuid,
    pub username: String,
    pub date: String,
    #[serde(serialize_with = "serialize_minutes")]
    pub duration: f64,
    pub description: String,
}

impl From<Exercise> for ExerciseResponse {
    fn from(exercise: Exercise) -> Self {
        Self {
            id: exercise.user_id,
            username: exercise.username,
            date: to_date_string(exercise.date),
            duration: exercise.duration,
            description: exercise.description,
        }
    }
}

#[derive(Serialize, Debug, PartialEq, ToSchema)]
pub struct LogEntryResponse {
    pub description: String,
    #[serde(serialize_with = "serialize_minutes")]
    pub duration: f64,
    pub date: String,
}

impl From<ExerciseSummary> for LogEntryResponse {
    fn from(summary: ExerciseSummary) -> Self {
        Self {
            description: summary.description,
            duration: summary.duration,
            date: to_date_string(summary.date),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct LogResponse {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub count: usize,
    pub log: Vec<LogEntryResponse>,
}

impl From<ExerciseLog> for LogResponse {
    fn from(log: ExerciseLog) -> Self {
        let count = log.count();
        Self {
            id: log.user.id,
            username: log.user.username,
            from: log.from.map(|d| to_date_string(Some(d))),
            to: log.to.map(|d| to_date_string(Some(d))),
            count,
            log: log.entries.into_iter().map(LogEntryResponse::from).collect(),
        }
    }
}

/// Every failure is reported with this body and a 200 status.
#[derive(Serialize, Debug, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

//=========================================================================================
// Field (De)serialization
//=========================================================================================

/// Whole durations go out as JSON integers (`30`, not `30.0`).
fn serialize_minutes<S>(minutes: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if minutes.fract() == 0.0 && minutes.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*minutes as i64)
    } else {
        serializer.serialize_f64(*minutes)
    }
}

/// Accepts strings, numbers and booleans alike, since HTML forms send
/// everything as text while JSON clients send typed values. `null` counts as
/// missing.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientVisitor;

    impl<'de> de::Visitor<'de> for LenientVisitor {
        type Value = Option<String>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string, number or boolean")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2>(self, deserializer: D2) -> Result<Self::Value, D2::Error>
        where
            D2: Deserializer<'de>,
        {
            deserializer.deserialize_any(LenientVisitor)
        }
    }

    deserializer.deserialize_any(LenientVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_json_numbers_become_strings() {
        let req: CreateExerciseRequest =
            serde_json::from_str(r#"{"description":"run","duration":30}"#).unwrap();
        assert_eq!(req.description.as_deref(), Some("run"));
        assert_eq!(req.duration.as_deref(), Some("30"));
        assert_eq!(req.date, None);
    }

    #[test]
    fn test_json_null_counts_as_missing() {
        let req: CreateUserRequest = serde_json::from_str(r#"{"username":null}"#).unwrap();
        assert_eq!(req.username, None);
    }

    #[test]
    fn test_log_response_omits_absent_bounds() {
        let response = LogResponse::from(ExerciseLog {
            user: User {
                id: Uuid::nil(),
                username: "alice".to_string(),
            },
            from: None,
            to: Some(Utc.with_ymd_and_hms(2023, 1, 31, 0, 0, 0).unwrap()),
            entries: vec![ExerciseSummary {
                description: "run".to_string(),
                duration: 30.0,
                date: Some(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()),
            }],
        });

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("from").is_none());
        assert_eq!(json["to"], "Tue Jan 31 2023");
        assert_eq!(json["count"], 1);
        assert_eq!(json["log"][0]["date"], "Sun Jan 01 2023");
        assert_eq!(json["log"][0]["duration"], serde_json::json!(30));
    }

    #[test]
    fn test_fractional_duration_is_kept() {
        let entry = LogEntryResponse::from(ExerciseSummary {
            description: "walk".to_string(),
            duration: 2.5,
            date: None,
        });
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["duration"], serde_json::json!(2.5));
        assert_eq!(json["date"], "Invalid Date");
    }
}
