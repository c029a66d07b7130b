pub mod extract;
pub mod protocol;
pub mod rest;
pub mod state;

pub use rest::{create_exercise_handler, create_user_handler, get_logs_handler, list_users_handler};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::web::{rest::ApiDoc, state::AppState};

/// Builds the complete application: the REST API, the OpenAPI document with
/// Swagger UI, the landing page and the static assets.
pub fn router(app_state: Arc<AppState>) -> Router {
    let config = app_state.config.clone();

    let api_router = Router::new()
        .route("/api/users", post(create_user_handler).get(list_users_handler))
        .route("/api/users/{user_id}/exercises", post(create_exercise_handler))
        .route("/api/users/{user_id}/logs", get(get_logs_handler))
        .with_state(app_state);

    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route_service("/", ServeFile::new(&config.index_path))
        .fallback_service(ServeDir::new(&config.public_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
