//! Server errors.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use portal_crypto::CryptoError;
use portal_database_interface::DatabaseError;
use portal_jobs_interface::JobError;
use thiserror::Error;

use crate::login::LoginError;

/// Server error.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not attach extension '{}',\n  caused by: {}", extension, source)]
    ExtensionError {
        extension: &'static str,
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Blueprint '{}' is already registered", name)]
    DuplicateBlueprint { name: String },

    #[error("Route {} {} of '{}' is already bound to '{}'", method, path, endpoint, existing)]
    DuplicateRoute {
        method: String,
        path: String,
        endpoint: String,
        existing: String,
    },

    #[error("Unknown endpoint '{}'", name)]
    UnknownEndpoint { name: String },

    #[error("Missing application context")]
    MissingContext,

    #[error("Invalid form: {}", reason)]
    InvalidForm { reason: String },

    #[error("Database error,\n  caused by: {}", source)]
    DatabaseError { source: DatabaseError },

    #[error("Job queue error,\n  caused by: {}", source)]
    JobError { source: JobError },

    #[error("Crypto error,\n  caused by: {}", source)]
    CryptoError { source: CryptoError },

    #[error("Login error,\n  caused by: {}", source)]
    LoginError { source: LoginError },

    #[error("Session error: {}", message)]
    SessionError { message: String },

    #[error("Threadpool error.")]
    ThreadpoolError,

    #[error("I/O error,\n  caused by: {}", source)]
    IoError { source: std::io::Error },
}

impl ServerError {
    pub(crate) fn extension<E>(extension: &'static str, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self::ExtensionError {
            extension,
            source: source.into(),
        }
    }
}

impl From<DatabaseError> for ServerError {
    fn from(source: DatabaseError) -> Self {
        Self::DatabaseError { source }
    }
}

impl From<JobError> for ServerError {
    fn from(source: JobError) -> Self {
        Self::JobError { source }
    }
}

impl From<CryptoError> for ServerError {
    fn from(source: CryptoError) -> Self {
        Self::CryptoError { source }
    }
}

impl From<LoginError> for ServerError {
    fn from(source: LoginError) -> Self {
        Self::LoginError { source }
    }
}

impl From<actix_web::error::BlockingError> for ServerError {
    fn from(_: actix_web::error::BlockingError) -> Self {
        Self::ThreadpoolError
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match &self {
            ServerError::InvalidForm { .. } => StatusCode::BAD_REQUEST,
            ServerError::DatabaseError {
                source: DatabaseError::UserAlreadyExists(_),
            } => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}

/// Result alias for `ServerError`.
pub type Result<T, E = ServerError> = core::result::Result<T, E>;
