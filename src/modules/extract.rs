use axum::{
    extract::{rejection::JsonRejection, FromRequest, OptionalFromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;

use crate::modules::response::ErrorResponse;

/// `Json<T>` whose rejections use the API error envelope instead of axum's
/// plain-text body.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

fn reject(rejection: JsonRejection) -> ErrorResponse {
    tracing::debug!(error = %rejection, "rejected request body");
    ErrorResponse::new(StatusCode::BAD_REQUEST, rejection.body_text())
}

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ErrorResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = <Json<T> as FromRequest<S>>::from_request(req, state)
            .await
            .map_err(reject)?;
        Ok(Self(value))
    }
}

/// Absent body (no `Content-Type`) yields `None`.
impl<T, S> OptionalFromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ErrorResponse;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let value = <Json<T> as OptionalFromRequest<S>>::from_request(req, state)
            .await
            .map_err(reject)?;
        Ok(value.map(|Json(v)| Self(v)))
    }
}
