//! Error types for mpr-web JSON endpoints

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mpr_common::validation::FieldError;
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Request body over the upload limit (413)
    #[error("Payload too large")]
    PayloadTooLarge,

    /// Failure reported by mpr-common (upstream, validation, config)
    #[error("Common error: {0}")]
    Common(#[from] mpr_common::Error),
}

impl ApiError {
    /// HTTP status, machine code and user-facing message
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        use mpr_common::Error as E;

        match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                "Os arquivos enviados excedem o tamanho máximo permitido.".to_string(),
            ),
            ApiError::Common(err) => {
                let (status, code) = match err {
                    E::Http { .. } => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
                    E::Timeout => (StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT"),
                    E::Network(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_UNAVAILABLE"),
                    E::InvalidResponse(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_INVALID_RESPONSE"),
                    E::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                    E::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                    E::Config(_) | E::Io(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                    }
                };
                (status, code, err.user_message())
            }
        }
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ApiError::Common(mpr_common::Error::Validation(errors)) => errors,
            _ => &[],
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = self.parts();

        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), code = error_code, error = %self, "Request failed");
        }

        let mut error = json!({
            "code": error_code,
            "message": message,
        });
        let fields = self.field_errors();
        if !fields.is_empty() {
            error["fields"] = json!(fields);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use mpr_common::Error;

    #[test]
    fn test_upstream_failures_map_to_gateway_statuses() {
        let (status, code, message) = ApiError::from(Error::Http { status: 503 }).parts();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(code, "UPSTREAM_ERROR");
        assert_eq!(message, "Serviço em manutenção. Tente novamente mais tarde.");

        let (status, _, message) = ApiError::from(Error::Timeout).parts();
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(message, "Tempo limite excedido. Tente novamente.");

        let (status, _, _) = ApiError::from(Error::Network("refused".into())).parts();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_validation_exposes_fields() {
        let err = ApiError::from(Error::Validation(vec![FieldError::new("data", "inválida")]));
        assert_eq!(err.parts().0, StatusCode::BAD_REQUEST);
        assert_eq!(err.field_errors().len(), 1);
        assert!(ApiError::NotFound("x".into()).field_errors().is_empty());
    }
}
