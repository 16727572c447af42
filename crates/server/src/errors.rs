use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use models::errors::ModelError;
use serde::Serialize;
use service::auth::errors::AuthError;
use service::errors::{ServiceError, LOGIN_REQUIRED};
use service::works::domain::{Destination, Outcome};
use tracing::error;

/// JSON error body: `{"error": ..., "detail": ...}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: String,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, detail: Option<String>) -> Self {
        Self { status, error: error.into(), detail }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({"error": self.error, "detail": self.detail}))).into_response()
    }
}

/// 302 with a `Location` header and the flash message in the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashRedirect {
    pub location: String,
    pub message: String,
}

impl FlashRedirect {
    pub fn to_root(message: impl Into<String>) -> Self {
        Outcome::new(Destination::Root, message).into()
    }
}

impl From<Outcome> for FlashRedirect {
    fn from(o: Outcome) -> Self {
        Self { location: o.destination.path(), message: o.message }
    }
}

impl IntoResponse for FlashRedirect {
    fn into_response(self) -> Response {
        (StatusCode::FOUND, [(header::LOCATION, self.location.clone())], Json(self)).into_response()
    }
}

/// Service failure as seen by HTTP clients.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self { Self(e) }
}

impl From<ModelError> for ApiError {
    fn from(e: ModelError) -> Self { Self(e.into()) }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        Self(match e {
            AuthError::Validation(m) => ServiceError::Validation(m),
            AuthError::NotFound => ServiceError::not_found("user"),
            AuthError::TokenError(m) | AuthError::Repository(m) => ServiceError::Db(m),
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            ServiceError::Forbidden => FlashRedirect::to_root(LOGIN_REQUIRED).into_response(),
            ServiceError::Validation(m) | ServiceError::Model(ModelError::Validation(m)) => {
                JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(m)).into_response()
            }
            ServiceError::NotFound(m) | ServiceError::Model(ModelError::NotFound(m)) => {
                JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(m)).into_response()
            }
            ServiceError::Db(m) | ServiceError::Model(ModelError::Db(m)) => {
                error!(err = %m, "request failed on storage");
                JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Error", None).into_response()
            }
        }
    }
}
