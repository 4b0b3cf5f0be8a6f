//! API error type and its mapping from pipeline errors.
//!
//! Classification failures are non-fatal: the handler returns a JSON error
//! body with an appropriate status code and no predictions, and the page
//! stays interactive for a retry.

use crate::core::ClassifierError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

/// JSON body returned for failed requests.
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    /// User-visible error message.
    pub error: String,
}

/// An error response produced by a handler.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// 400 Bad Request.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// 422 Unprocessable Entity.
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: message.into(),
        }
    }

    /// 500 Internal Server Error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    /// The status code of this error.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The user-visible message of this error.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ClassifierError> for ApiError {
    fn from(err: ClassifierError) -> Self {
        match &err {
            ClassifierError::ImageDecode(_) => {
                Self::unprocessable("could not decode the uploaded file as an image")
            }
            ClassifierError::InvalidInput { message } => Self::bad_request(message.clone()),
            _ => {
                error!(error = %err, "classification failed");
                Self::internal(format!("error classifying image: {err}"))
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_errors_map_to_unprocessable() {
        let err = crate::utils::decode_image(b"junk").unwrap_err();
        let api: ApiError = err.into();
        assert_eq!(api.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let api: ApiError = ClassifierError::invalid_input("empty upload").into();
        assert_eq!(api.status(), StatusCode::BAD_REQUEST);
        assert_eq!(api.message(), "empty upload");
    }

    #[test]
    fn other_errors_map_to_internal() {
        let api: ApiError = ClassifierError::config_error("bad config").into();
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(api.message().contains("error classifying image"));
    }
}
