use axum::http::StatusCode;

use crate::api::rest::problem::{Problem, ProblemResponse};
use crate::domain::error::DomainError;

/// Build a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.donor-match.dev/{code}"))
        .with_code(code)
        .with_instance(instance);

    let problem = match tracing::Span::current().id() {
        Some(id) => problem.with_trace_id(id.into_u64().to_string()),
        None => problem,
    };

    ProblemResponse(problem)
}

/// Map domain error to RFC 9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::InvalidInput { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "INVALID_INPUT",
            "Invalid input",
            e.to_string(),
            instance,
        ),
        DomainError::DonorNotFound { id } => from_parts(
            StatusCode::NOT_FOUND,
            "DONORS_NOT_FOUND",
            "Donor not found",
            format!("Donor with id {id} was not found"),
            instance,
        ),
        DomainError::RequestNotFound { id } => from_parts(
            StatusCode::NOT_FOUND,
            "REQUESTS_NOT_FOUND",
            "Blood request not found",
            format!("Blood request with id {id} was not found"),
            instance,
        ),
        DomainError::ContactAlreadyExists { contact } => from_parts(
            StatusCode::CONFLICT,
            "CONTACT_CONFLICT",
            "Contact already registered",
            format!("Contact '{contact}' is already in use"),
            instance,
        ),
        DomainError::ConcurrentUpdate { id } => from_parts(
            StatusCode::CONFLICT,
            "CONCURRENT_UPDATE",
            "Concurrent update",
            format!("Donor {id} changed while the donation was being recorded; retry"),
            instance,
        ),
        DomainError::Database { .. } => {
            // Details stay in the logs
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
