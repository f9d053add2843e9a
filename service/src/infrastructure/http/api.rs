use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::notification::NotificationError;
use crate::domain::repository::RepositoryError;
use crate::domain::sidebar::SidebarError;
use crate::domain::slug::SlugAllocationError;
use crate::domain::suggestion::WizardError;

// ApiSuccess is a wrapper around a response that includes a status code.

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize>(StatusCode, Json<T>);

impl<T: Serialize> ApiSuccess<T> {
    pub(crate) fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// `302 Found` pointing at another page of the site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRedirect(pub String);

impl IntoResponse for ApiRedirect {
    fn into_response(self) -> Response {
        (StatusCode::FOUND, [(header::LOCATION, self.0)]).into_response()
    }
}

// ApiError is a wrapper around a response that includes a status code.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    UnprocessableEntity(String),
    ConflictWithServerState(String),
    PayloadTooLarge(String),
    NotFound,
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::InternalServerError(e.to_string())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::ValidationFailed(cause) => Self::UnprocessableEntity(cause),
            RepositoryError::UniqueViolation(cause) => Self::ConflictWithServerState(cause),
            RepositoryError::DatabaseError(cause) => {
                tracing::error!("{:?}", cause);
                Self::InternalServerError("Database server error".to_string())
            }
        }
    }
}

impl From<WizardError> for ApiError {
    fn from(value: WizardError) -> Self {
        match value {
            WizardError::NotFound(_) => Self::NotFound,
            WizardError::NotYourEvent | WizardError::NotSubmitted => {
                Self::BadRequest(value.to_string())
            }
            WizardError::Repository(cause)
            | WizardError::Notification(NotificationError::Repository(cause))
            | WizardError::Slug(SlugAllocationError::Repository(cause)) => cause.into(),
            other => Self::InternalServerError(other.to_string()),
        }
    }
}

impl From<SidebarError> for ApiError {
    fn from(value: SidebarError) -> Self {
        match value {
            SidebarError::Repository(cause) => cause.into(),
            other => Self::InternalServerError(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use ApiError::*;

        match self {
            InternalServerError(e) => {
                tracing::error!("{}", e);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            BadRequest(message) => error_response(StatusCode::BAD_REQUEST, message),
            UnprocessableEntity(message) => {
                error_response(StatusCode::UNPROCESSABLE_ENTITY, message)
            }
            ConflictWithServerState(message) => error_response(StatusCode::CONFLICT, message),
            PayloadTooLarge(message) => error_response(StatusCode::PAYLOAD_TOO_LARGE, message),
            NotFound => StatusCode::NOT_FOUND.into_response(),
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ApiResponseBody::new_error(status, message))).into_response()
}

// Generic response structure shared by all API responses.

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    pub status_code: u16,
    pub data: T,
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

/// The response data format for all error responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}
