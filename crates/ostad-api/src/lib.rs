//! API response envelope and error types.
//!
//! Every endpoint answers `{ "success": true, ...payload }` on success and
//! `{ "success": false, "message": "..." }` with an HTTP status drawn from
//! the error otherwise. No structured error codes are exposed; clients key
//! off the status and the human-readable message.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Successful response envelope.
///
/// The payload is flattened next to the `success` flag, so a payload struct
/// is also the endpoint's field allow-list: anything not on it is dropped.
#[derive(Debug, Clone, Serialize)]
pub struct ApiSuccess<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub payload: T,
}

impl<T: Serialize> ApiSuccess<T> {
    pub fn new(payload: T) -> Self {
        Self {
            success: true,
            payload,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, axum::Json(self)).into_response()
    }
}

/// API error with an HTTP status mapping.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => msg,
        }
    }
}

/// Failure body shape.
#[derive(Debug, Serialize)]
struct FailureBody<'a> {
    success: bool,
    message: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::to_vec(&FailureBody {
            success: false,
            message: self.message(),
        })
        .unwrap_or_else(|_| br#"{"success":false,"message":"serialization failure"}"#.to_vec());

        let mut response = Response::new(axum::body::Body::from(body));
        *response.status_mut() = status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response
    }
}

impl From<ostad_storage::StorageError> for ApiError {
    fn from(err: ostad_storage::StorageError) -> Self {
        use ostad_storage::StorageError;
        match err {
            StorageError::NotFound { .. } => Self::NotFound(err.to_string()),
            StorageError::AlreadyExists { .. } => Self::Conflict(err.to_string()),
            StorageError::InvalidEntity { .. } => Self::BadRequest(err.to_string()),
            StorageError::ConnectionError { .. } | StorageError::Internal { .. } => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<ostad_core::CoreError> for ApiError {
    fn from(err: ostad_core::CoreError) -> Self {
        if err.is_client_error() {
            match err.category() {
                ostad_core::ErrorCategory::NotFound => Self::NotFound(err.to_string()),
                ostad_core::ErrorCategory::Conflict => Self::Conflict(err.to_string()),
                _ => Self::BadRequest(err.to_string()),
            }
        } else {
            Self::Internal(err.to_string())
        }
    }
}

/// Convenience result type for handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn success_envelope_flattens_payload() {
        #[derive(Serialize)]
        struct Payload {
            academies: Vec<String>,
        }

        let body = serde_json::to_value(ApiSuccess::new(Payload {
            academies: vec!["rahnema".into()],
        }))
        .unwrap();

        assert_eq!(body["success"], serde_json::json!(true));
        assert_eq!(body["academies"][0], serde_json::json!("rahnema"));
        assert!(body.get("payload").is_none());
    }

    #[test]
    fn into_response_sets_status_and_content_type() {
        let resp = ApiError::bad_request("invalid page").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap();
        assert_eq!(content_type, &HeaderValue::from_static("application/json"));
    }

    #[test]
    fn api_error_variants_map_to_status() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (ApiError::bad_request("x"), StatusCode::BAD_REQUEST),
            (ApiError::not_found("x"), StatusCode::NOT_FOUND),
            (ApiError::conflict("x"), StatusCode::CONFLICT),
            (ApiError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status);
        }
    }

    #[test]
    fn storage_errors_map_to_api_errors() {
        let err: ApiError = ostad_storage::StorageError::not_found("academy", "x").into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err: ApiError = ostad_storage::StorageError::internal("db down").into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
