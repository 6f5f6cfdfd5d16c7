// HTTP API Error Types
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::auth::JwtError;
use crate::database::{BadData, DataError};

/// HTTP API error with its status code and a client-safe message
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Machine-readable code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code()
        })
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

impl From<DataError> for ApiError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::BadData(BadData::NotFound(msg)) => ApiError::not_found(msg),
            DataError::BadData(BadData::NoReadPermission(msg)) => ApiError::unauthorized(msg),
            DataError::BadData(BadData::NoWritePermission(msg)) => ApiError::unauthorized(msg),
            DataError::BadData(BadData::Invalid(msg)) => ApiError::bad_request(msg),
            DataError::BadData(BadData::Protected(msg)) => ApiError::conflict(msg),
            DataError::InvalidIdentifier(msg) => ApiError::bad_request(msg),
            DataError::DuplicateKey(msg) => ApiError::conflict(format!("duplicate key: {}", msg)),
            DataError::Database(sqlx_err) => {
                // Log the real error but return a generic message
                tracing::error!("Database error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::InvalidToken(_) => ApiError::unauthorized(err.to_string()),
            JwtError::MissingSecret | JwtError::InvalidExpiry(_) | JwtError::TokenGeneration(_) => {
                tracing::error!("Token error: {}", err);
                ApiError::internal_server_error("Could not issue token")
            }
        }
    }
}

impl From<argon2::password_hash::Error> for ApiError {
    fn from(err: argon2::password_hash::Error) -> Self {
        tracing::error!("Password hashing error: {}", err);
        ApiError::internal_server_error("Could not process password")
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
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
    fn data_errors_map_to_statuses() {
        let cases = [
            (DataError::not_found("x"), StatusCode::NOT_FOUND),
            (DataError::no_read_permission("x"), StatusCode::UNAUTHORIZED),
            (DataError::no_write_permission("x"), StatusCode::UNAUTHORIZED),
            (DataError::invalid("x"), StatusCode::BAD_REQUEST),
            (DataError::protected("x"), StatusCode::CONFLICT),
            (DataError::InvalidIdentifier("x".into()), StatusCode::BAD_REQUEST),
            (DataError::DuplicateKey("x".into()), StatusCode::CONFLICT),
            (DataError::Database(sqlx::Error::RowNotFound), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn database_error_details_are_hidden() {
        let err = ApiError::from(DataError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.message(), "Database error occurred");
    }

    #[test]
    fn error_body_uses_failure_envelope() {
        let body = ApiError::not_found("did not find card").to_json();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "did not find card");
        assert_eq!(body["code"], "NOT_FOUND");
    }
}
