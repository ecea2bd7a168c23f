use api_ingress::problem::{Problem, ProblemResponse};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;

use crate::domain::error::DomainError;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    Problem::new(status, title, detail)
        .with_code(code)
        .with_instance(instance)
        .with_current_span()
        .into()
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::InstitutionNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "REGISTRY_INSTITUTION_NOT_FOUND",
            "Institution not found",
            e.to_string(),
            instance,
        ),
        DomainError::UserNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "REGISTRY_USER_NOT_FOUND",
            "User not found",
            e.to_string(),
            instance,
        ),
        DomainError::InvalidDate { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "REGISTRY_INVALID_DATE",
            "Invalid date",
            e.to_string(),
            instance,
        ),
        DomainError::Validation { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "REGISTRY_VALIDATION",
            "Validation error",
            e.to_string(),
            instance,
        ),
        DomainError::SurnamesAlreadyExist { .. } => from_parts(
            StatusCode::CONFLICT,
            "REGISTRY_SURNAME_CONFLICT",
            "Surnames already exist",
            e.to_string(),
            instance,
        ),
        DomainError::InstitutionInUse { .. } => from_parts(
            StatusCode::CONFLICT,
            "REGISTRY_INSTITUTION_IN_USE",
            "Institution in use",
            e.to_string(),
            instance,
        ),
        DomainError::Database { .. } => {
            // details stay in the log
            tracing::error!(error = ?e, "Database error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_DB",
                "Internal error",
                "An internal database error occurred",
                instance,
            )
        }
    }
}

/// Missing fields, wrong types, bad JSON or a wrong content type.
pub fn map_json_rejection(rejection: &JsonRejection, instance: &str) -> ProblemResponse {
    from_parts(
        rejection.status(),
        "REGISTRY_INVALID_BODY",
        "Invalid request body",
        rejection.body_text(),
        instance,
    )
}
