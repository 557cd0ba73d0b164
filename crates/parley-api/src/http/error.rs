//! Application error type mapping to HTTP status codes.
//!
//! Every error crosses the wire as `{"error": message}` with the matching
//! status -- only the error's message text, never internal detail.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use parley_types::error::ChatError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Empty or malformed request input.
    Validation(String),
    /// The remote completion call failed.
    Model(String),
    /// A persistence write failed.
    Storage(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::Validation(message) => AppError::Validation(message),
            ChatError::Model(message) => AppError::Model(message),
            ChatError::Storage(err) => AppError::Storage(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Model(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
            AppError::Storage(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use parley_types::error::StoreError;

    #[test]
    fn test_validation_maps_to_400() {
        let response = AppError::Validation("Message is required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_model_and_storage_map_to_500() {
        for err in [
            AppError::Model("upstream".to_string()),
            AppError::Storage("disk".to_string()),
        ] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_chat_error_conversion() {
        let err: AppError = ChatError::Validation("empty".to_string()).into();
        assert!(matches!(err, AppError::Validation(_)));

        let err: AppError = ChatError::Storage(StoreError::Connection).into();
        assert!(matches!(err, AppError::Storage(_)));
    }
}
