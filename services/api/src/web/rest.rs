//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.
//!
//! Every failure is answered with `200 OK` and an `{"error": ...}` body;
//! clients tell success from failure by the shape of the payload.

use crate::web::{
    extract::FormOrJson,
    protocol::{
        CreateExerciseRequest, CreateUserRequest, ErrorResponse, ExerciseResponse,
        LogEntryResponse, LogQuery, LogResponse, UserResponse,
    },
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use exercise_tracker_core::tracker::{self, ExerciseInput, LogFilter, TrackerError};
use std::sync::Arc;
use tracing::error;
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        create_user_handler,
        list_users_handler,
        create_exercise_handler,
        get_logs_handler,
    ),
    components(
        schemas(
            CreateUserRequest,
            CreateExerciseRequest,
            UserResponse,
            ExerciseResponse,
            LogEntryResponse,
            LogResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Exercise Tracker API", description = "Users, exercises and exercise logs.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Replies
//=========================================================================================

/// An error rendered as `{"error": message}` with a 200 status.
#[derive(Debug)]
pub struct ErrorReply(String);

impl ErrorReply {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// Validation and lookup failures are shown as-is. Storage failures are
    /// logged and replaced by `generic`.
    fn from_tracker(err: TrackerError, generic: &str) -> Self {
        match err {
            TrackerError::Port(e) => {
                error!("{}: {:?}", generic, e);
                Self::new(generic)
            }
            other => Self::new(other.to_string()),
        }
    }
}

impl IntoResponse for ErrorReply {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(ErrorResponse { error: self.0 })).into_response()
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Create a new user.
///
/// Accepts JSON or an urlencoded form with a `username` field.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "The created user, or an `{error}` body", body = UserResponse),
    )
)]
pub async fn create_user_handler(
    State(app_state): State<Arc<AppState>>,
    FormOrJson(req): FormOrJson<CreateUserRequest>,
) -> Result<Json<UserResponse>, ErrorReply> {
    let user = tracker::create_user(app_state.db.as_ref(), req.username.as_deref())
        .await
        .map_err(|e| ErrorReply::from_tracker(e, "failed to create user"))?;
    Ok(Json(UserResponse::from(user)))
}

/// List every user.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users in creation order", body = [UserResponse]),
    )
)]
pub async fn list_users_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserResponse>>, ErrorReply> {
    let users = tracker::list_users(app_state.db.as_ref())
        .await
        .map_err(|e| ErrorReply::from_tracker(e, "something went wrong"))?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Log an exercise for a user.
///
/// `date` is optional and defaults to the current time.
#[utoipa::path(
    post,
    path = "/api/users/{user_id}/exercises",
    request_body = CreateExerciseRequest,
    responses(
        (status = 200, description = "The logged exercise, or an `{error}` body", body = ExerciseResponse),
    ),
    params(
        ("user_id" = String, Path, description = "The id of the owning user.")
    )
)]
pub async fn create_exercise_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    FormOrJson(req): FormOrJson<CreateExerciseRequest>,
) -> Result<Json<ExerciseResponse>, ErrorReply> {
    let input = ExerciseInput {
        description: req.description,
        duration: req.duration,
        date: req.date,
    };
    let exercise = tracker::log_exercise(app_state.db.as_ref(), &user_id, &input, Utc::now())
        .await
        .map_err(|e| ErrorReply::from_tracker(e, "failed to save exercise"))?;
    Ok(Json(ExerciseResponse::from(exercise)))
}

/// Fetch a user's exercise log, optionally restricted to a date range.
#[utoipa::path(
    get,
    path = "/api/users/{user_id}/logs",
    responses(
        (status = 200, description = "The filtered log, or an `{error}` body", body = LogResponse),
    ),
    params(
        ("user_id" = String, Path, description = "The id of the user."),
        LogQuery,
    )
)]
pub async fn get_logs_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<LogQuery>,
) -> Result<Json<LogResponse>, ErrorReply> {
    let filter = LogFilter {
        from: query.from,
        to: query.to,
        limit: query.limit,
    };
    let log = tracker::exercise_log(app_state.db.as_ref(), &user_id, &filter, Utc::now())
        .await
        .map_err(|e| ErrorReply::from_tracker(e, "something went wrong"))?;
    Ok(Json(LogResponse::from(log)))
}
