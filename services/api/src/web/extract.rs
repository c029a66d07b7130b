//! services/api/src/web/extract.rs
//!
//! Request body extraction shared by the POST handlers.

use axum::{
    extract::{FromRequest, Request},
    http::header,
    Form, Json,
};
use serde::de::DeserializeOwned;

use crate::web::rest::ErrorReply;

/// Deserializes the body as JSON or as an urlencoded form, depending on the
/// `Content-Type` header. Any other body type yields `T::default()`, which the
/// validators then report as missing fields.
pub struct FormOrJson<T>(pub T);

impl<T, S> FromRequest<S> for FormOrJson<T>
where
    T: DeserializeOwned + Default + Send,
    S: Send + Sync,
{
    type Rejection = ErrorReply;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let Json(payload) = Json::<T>::from_request(req, state)
                .await
                .map_err(|rejection| ErrorReply::new(rejection.body_text()))?;
            Ok(Self(payload))
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(payload) = Form::<T>::from_request(req, state)
                .await
                .map_err(|rejection| ErrorReply::new(rejection.body_text()))?;
            Ok(Self(payload))
        } else {
            Ok(Self(T::default()))
        }
    }
}
