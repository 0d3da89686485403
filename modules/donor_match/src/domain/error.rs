use thiserror::Error;
use uuid::Uuid;

use crate::contract::model::{UnknownBloodGroup, UnknownUrgency};

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid input: {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("Donor not found: {id}")]
    DonorNotFound { id: Uuid },

    #[error("Blood request not found: {id}")]
    RequestNotFound { id: Uuid },

    #[error("Donor with contact '{contact}' already exists")]
    ContactAlreadyExists { contact: String },

    #[error("Donor {id} was modified concurrently")]
    ConcurrentUpdate { id: Uuid },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn donor_not_found(id: Uuid) -> Self {
        Self::DonorNotFound { id }
    }

    pub fn request_not_found(id: Uuid) -> Self {
        Self::RequestNotFound { id }
    }

    pub fn contact_already_exists(contact: String) -> Self {
        Self::ContactAlreadyExists { contact }
    }

    pub fn concurrent_update(id: Uuid) -> Self {
        Self::ConcurrentUpdate { id }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

impl From<UnknownBloodGroup> for DomainError {
    fn from(e: UnknownBloodGroup) -> Self {
        Self::invalid_input("blood_group", e.to_string())
    }
}

impl From<UnknownUrgency> for DomainError {
    fn from(e: UnknownUrgency) -> Self {
        Self::invalid_input("urgency", e.to_string())
    }
}
