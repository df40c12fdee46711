// Authentication error types and their HTTP mapping

use crate::db::DaoError;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

/// Errors surfaced by the authentication layer
///
/// Every credential or token failure collapses into `InvalidCredentials` so
/// callers cannot tell which check failed.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Could not validate credentials")]
    InvalidCredentials,

    #[error("Missing authentication token")]
    MissingToken,

    #[error("Unable to create user")]
    RegistrationConflict,

    #[error("Store unavailable")]
    StoreUnavailable,

    /// Caller bug or unexpected state; the detail is logged, never returned
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Validation error")]
    Validation(#[from] validator::ValidationErrors),
}

impl From<DaoError> for AuthError {
    fn from(e: DaoError) -> Self {
        match e {
            DaoError::StoreUnavailable(_) => AuthError::StoreUnavailable,
            DaoError::IncorrectRowCount { .. } => AuthError::InvalidCredentials,
            DaoError::DuplicateKey => AuthError::RegistrationConflict,
            DaoError::InvalidArgument(msg) | DaoError::MalformedRow(msg) => AuthError::Internal(msg),
        }
    }
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::RegistrationConflict => StatusCode::CONFLICT,
            AuthError::StoreUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get a descriptive error message for this error
    /// This message is safe to send to clients (no sensitive data)
    pub fn error_message(&self) -> String {
        match self {
            AuthError::StoreUnavailable | AuthError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::Internal(msg) => error!("Internal error in auth: {}", msg),
            AuthError::StoreUnavailable => error!("Auth request failed: store unavailable"),
            AuthError::Validation(errors) => debug!("Validation error: {:?}", errors),
            _ => debug!("Auth request rejected: {}", self),
        }

        let status = self.status_code();
        let mut body = json!({ "error": self.error_message() });
        if let AuthError::Validation(errors) = &self {
            body["details"] = serde_json::to_value(errors).unwrap_or_else(|_| json!({}));
        }

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_store_failure_detail_is_not_exposed() {
        let dao = DaoError::StoreUnavailable(sqlx::Error::Io(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            "10.0.0.7:3306",
        )));
        let error = AuthError::from(dao);

        assert!(matches!(error, AuthError::StoreUnavailable));
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.error_message(), "Internal server error");
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let error = AuthError::from(DaoError::InvalidArgument("no key".to_string()));
        assert_eq!(error.error_message(), "Internal server error");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AuthError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::MissingToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::RegistrationConflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::from(DaoError::DuplicateKey).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_unauthorized_response_carries_challenge() {
        let response = AuthError::InvalidCredentials.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }
}
