use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Institution not found: {id}")]
    InstitutionNotFound { id: i32 },

    #[error("User not found for rut '{rut}'")]
    UserNotFound { rut: String },

    #[error("A user with surnames '{surnames}' already exists")]
    SurnamesAlreadyExist { surnames: String },

    #[error("Institution {id} still has {projects} project(s)")]
    InstitutionInUse { id: i32, projects: u64 },

    #[error("Invalid date for {field}: '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { field: String, value: String },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn institution_not_found(id: i32) -> Self {
        Self::InstitutionNotFound { id }
    }

    pub fn user_not_found(rut: impl Into<String>) -> Self {
        Self::UserNotFound { rut: rut.into() }
    }

    pub fn surnames_already_exist(surnames: impl Into<String>) -> Self {
        Self::SurnamesAlreadyExist {
            surnames: surnames.into(),
        }
    }

    pub fn institution_in_use(id: i32, projects: u64) -> Self {
        Self::InstitutionInUse { id, projects }
    }

    pub fn invalid_date(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidDate {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
