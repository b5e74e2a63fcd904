use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use graphpress_types::api::{ErrorCode, Failure};

/// Every way a request can fail. Each variant renders as a [`Failure`] envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    MissingFields(&'static str),

    #[error("Invalid recipient")]
    InvalidRecipientId,

    #[error("Message can't be empty")]
    EmptyMessage,

    #[error("Invalid message ID")]
    InvalidMessageId,

    #[error("Message ID is not associated with the logged in user.")]
    UnauthorizedMessageAccess,

    #[error("A valid session is required.")]
    NoSession,

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    InvalidSignup(&'static str),

    #[error("Invalid username or password.")]
    InvalidCredentials,

    #[error("Username is already taken.")]
    UsernameTaken,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::MissingFields(_) => ErrorCode::MissingFields,
            ApiError::InvalidRecipientId => ErrorCode::InvalidRecipientId,
            ApiError::EmptyMessage => ErrorCode::EmptyMessage,
            ApiError::InvalidMessageId => ErrorCode::InvalidMessageId,
            ApiError::UnauthorizedMessageAccess => ErrorCode::UnauthorizedMessageAccess,
            ApiError::NoSession => ErrorCode::NoSession,
            ApiError::NotFound(_) => ErrorCode::NotFound,
            ApiError::InvalidSignup(_) => ErrorCode::InvalidSignup,
            ApiError::InvalidCredentials => ErrorCode::InvalidCredentials,
            ApiError::UsernameTaken => ErrorCode::UsernameTaken,
            ApiError::Internal(_) => ErrorCode::Internal,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NoSession | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::UnauthorizedMessageAccess => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UsernameTaken => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MissingFields(_)
            | ApiError::InvalidRecipientId
            | ApiError::EmptyMessage
            | ApiError::InvalidMessageId
            | ApiError::InvalidSignup(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn log(&self) {
        let code = self.code().as_str();
        if self.status_code().is_server_error() {
            tracing::error!(error = %self, error_code = code, "Request failed");
        } else {
            tracing::debug!(error = %self, error_code = code, "Request rejected");
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        self.log();

        let status = self.status_code();
        // Store failures stay in the logs
        let reason = match &self {
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(Failure::new(self.code(), reason))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_hide_details() {
        let err = ApiError::from(anyhow::anyhow!("disk on fire"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), ErrorCode::Internal);
    }

    #[test]
    fn validation_errors_are_bad_requests() {
        for err in [
            ApiError::MissingFields("x"),
            ApiError::InvalidRecipientId,
            ApiError::EmptyMessage,
            ApiError::InvalidMessageId,
        ] {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
        assert_eq!(ApiError::NoSession.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::UnauthorizedMessageAccess.status_code(),
            StatusCode::FORBIDDEN
        );
    }
}
