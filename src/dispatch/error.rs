//! Errors raised by controllers and resolvers, and the status taxonomy they
//! map onto.

use thiserror::Error;

use crate::http::response::StatusCode;

/// Result type for controller operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Errors a controller may return. Anything that is not one of the explicit
/// kinds is carried as `Internal` and answered with 500.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The domain rejected the operation
    #[error("{message}")]
    Forbidden {
        message: String,
        code: Option<String>,
    },

    /// The addressed resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// The operation is not offered for this resource
    #[error("{0}")]
    MethodNotAllowed(String),

    /// Any other failure
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DomainError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        DomainError::Forbidden {
            message: message.into(),
            code: None,
        }
    }

    pub fn forbidden_with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        DomainError::Forbidden {
            message: message.into(),
            code: Some(code.into()),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        DomainError::NotFound(message.into())
    }

    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        DomainError::MethodNotAllowed(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::Internal(anyhow::anyhow!(message.into()))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Forbidden { .. } => ErrorKind::Forbidden,
            DomainError::NotFound(_) => ErrorKind::NotFound,
            DomainError::MethodNotAllowed(_) => ErrorKind::MethodNotAllowed,
            DomainError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Error returned by a procedure resolver when it refuses to execute.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// The resolver rejected the call; answered with 403
    #[error("{message}")]
    Rejected {
        message: String,
        code: Option<String>,
    },

    /// Any other failure; answered with 500
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ExecuteError {
    pub fn rejected(message: impl Into<String>, code: Option<String>) -> Self {
        ExecuteError::Rejected {
            message: message.into(),
            code,
        }
    }
}

/// The closed set of failure kinds, each owning one status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    BadRequest,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    Internal,
}

impl ErrorKind {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorKind::Unauthorized => StatusCode::Unauthorized,
            ErrorKind::BadRequest => StatusCode::BadRequest,
            ErrorKind::Forbidden => StatusCode::Forbidden,
            ErrorKind::NotFound => StatusCode::NotFound,
            ErrorKind::MethodNotAllowed => StatusCode::MethodNotAllowed,
            ErrorKind::Internal => StatusCode::InternalServerError,
        }
    }
}
