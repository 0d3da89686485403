use thiserror::Error;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DonorMatchError {
    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error")]
    Internal,
}

impl DonorMatchError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for DonorMatchError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            InvalidInput { field, message } => Self::validation(format!("{field}: {message}")),
            DonorNotFound { id } => Self::not_found(format!("donor {id}")),
            RequestNotFound { id } => Self::not_found(format!("blood request {id}")),
            ContactAlreadyExists { contact } => {
                Self::conflict(format!("contact '{contact}' is already registered"))
            }
            ConcurrentUpdate { id } => {
                Self::conflict(format!("donor {id} was modified concurrently"))
            }
            Database { .. } => Self::internal(),
        }
    }
}
