use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::error::{CredentialError, RegistrationError, TokenError};
use shared::flows::ErrorBody;
use thiserror::Error;
use tracing::error;

/// Renders as `{ "kind": ..., "message": ... }`. Storage and internal
/// details go to the log only.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    WeakPassword(&'static str),

    #[error("invalid email or password")]
    InvalidCredentials,

    /// Missing, invalid or expired session token.
    #[error("authentication required")]
    Unauthenticated,

    #[error("wrong password")]
    WrongPassword,

    #[error("not found")]
    NotFound,

    #[error("email already registered")]
    EmailTaken,

    /// Stored wallet address and wrapped key disagree.
    #[error("stored key material failed its integrity check")]
    AddressMismatch,

    #[error("storage unavailable")]
    Persistence(#[from] sqlx::Error),

    #[error("internal error")]
    Internal(String),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::WeakPassword(_) => "weak_password",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::Unauthenticated => "unauthenticated",
            ApiError::WrongPassword => "wrong_password",
            ApiError::NotFound => "not_found",
            ApiError::EmailTaken => "email_taken",
            ApiError::AddressMismatch => "address_mismatch",
            ApiError::Persistence(_) => "dependency_error",
            ApiError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::WeakPassword(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Unauthenticated | ApiError::WrongPassword => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::EmailTaken => StatusCode::CONFLICT,
            ApiError::AddressMismatch | ApiError::Persistence(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            kind: self.kind().to_string(),
            message: self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Persistence(e) => error!(error = %e, "storage failure"),
            ApiError::Internal(detail) => error!(%detail, "internal error"),
            _ => {}
        }

        (self.status(), Json(self.body())).into_response()
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::WeakPassword(reason) => ApiError::WeakPassword(reason),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidToken | TokenError::Expired => ApiError::Unauthenticated,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Credential(e) => e.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
