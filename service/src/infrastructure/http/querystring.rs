use std::ops::Deref;

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde_querystring::ParseMode;

use crate::infrastructure::http::api::ApiError;

/// Query string where a repeated key fills a list, e.g.
/// `?channels=main&channels=music`
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryString<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryString<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or_default();
        let value = serde_querystring::from_str(query, ParseMode::Duplicate).map_err(|e| {
            ApiError::UnprocessableEntity(format!("Failed to deserialize query string: {}", e))
        })?;
        Ok(QueryString(value))
    }
}

impl<T> Deref for QueryString<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// `application/x-www-form-urlencoded` body, read with the same rules as
/// [`QueryString`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FormString<T>(pub T);

impl<T, S> FromRequest<S> for FormString<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(request, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        let value = serde_querystring::from_bytes(&body, ParseMode::Duplicate).map_err(|e| {
            ApiError::UnprocessableEntity(format!("Failed to deserialize form: {}", e))
        })?;
        Ok(FormString(value))
    }
}
