// HTTP API error mapping
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::services::DomainError;
use crate::store::StoreError;

/// HTTP-facing error with the response body shape `{"message": "..."}`.
/// Internal detail never reaches the client; storage and integrity failures
/// are logged server-side and surfaced as a generic 500.
#[derive(Debug)]
pub enum ApiError {
    // 400
    BadRequest(String),
    // 401
    Unauthorized(String),
    // 404
    NotFound(String),
    // 500
    Internal,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) | ApiError::Unauthorized(msg) | ApiError::NotFound(msg) => {
                msg
            }
            ApiError::Internal => "Internal server error",
        }
    }

    pub fn to_json(&self) -> Value {
        json!({ "message": self.message() })
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::Conflict(msg) => {
                ApiError::BadRequest(msg)
            }
            DomainError::NotFound(msg) => ApiError::NotFound(msg),
            DomainError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            DomainError::Integrity(msg) => {
                tracing::error!("integrity fault: {}", msg);
                ApiError::Internal
            }
            DomainError::Store(err) => err.into(),
            DomainError::Auth(err) => err.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            // A unique-key violation that slipped past the service pre-checks
            // is still a client conflict, not a server fault. The constraint
            // name stays in the log.
            StoreError::Conflict(msg) => {
                tracing::warn!("store conflict: {}", msg);
                ApiError::bad_request("Duplicate record")
            }
            other => {
                // Real cause goes to the log, never to the client
                tracing::error!("store error: {}", other);
                ApiError::Internal
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenInvalid => ApiError::unauthorized("Invalid token"),
            other => {
                tracing::error!("auth error: {}", other);
                ApiError::Internal
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_http_statuses() {
        let cases = [
            (DomainError::validation("bad"), StatusCode::BAD_REQUEST),
            (DomainError::conflict("dup"), StatusCode::BAD_REQUEST),
            (DomainError::not_found("missing"), StatusCode::NOT_FOUND),
            (DomainError::unauthorized("nope"), StatusCode::UNAUTHORIZED),
            (
                DomainError::Integrity("orphan account".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                DomainError::Store(StoreError::Timeout),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                DomainError::Store(StoreError::Conflict("duplicate key".into())),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn internal_errors_do_not_leak_detail() {
        let err = ApiError::from(DomainError::Store(StoreError::Query(
            "relation accounts does not exist".into(),
        )));
        assert_eq!(err.message(), "Internal server error");
    }

    #[test]
    fn store_conflicts_surface_without_constraint_detail() {
        let err = ApiError::from(StoreError::Conflict(
            "duplicate key value violates unique constraint \"students_reg_no_key\"".into(),
        ));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(!err.message().contains("students_reg_no_key"));
    }
}
