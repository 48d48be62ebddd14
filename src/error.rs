use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use thiserror::Error;

use crate::models::bookings::BookingStatus;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("{0} not found")]
    NotFound(String),

    /// A foreign reference that could not be resolved to a stored row.
    #[error("Could not resolve {kind} '{reference}': {reason}")]
    UnresolvedReference {
        kind: &'static str,
        reference: String,
        reason: String,
    },

    #[error("{0}")]
    Validation(String),

    #[error("Cannot move booking from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Unavailable(String),
}

impl ServiceError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ServiceError::NotFound(what.into())
    }

    pub fn unresolved(kind: &'static str, reference: impl Into<String>, reason: impl Into<String>) -> Self {
        ServiceError::UnresolvedReference {
            kind,
            reference: reference.into(),
            reason: reason.into(),
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::UnresolvedReference { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::InvalidTransition { .. } | ServiceError::Conflict(_) => {
                StatusCode::CONFLICT
            }
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ServiceError::Database(e) => {
                tracing::error!("Database error: {e}");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": message,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_reference_names_the_reference() {
        let err = ServiceError::unresolved("provider", "auth-42", "no user with this id");
        assert_eq!(
            err.to_string(),
            "Could not resolve provider 'auth-42': no user with this id"
        );
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn database_errors_do_not_leak_details() {
        let err = ServiceError::from(DbErr::Custom("connection refused".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn transition_error_is_a_conflict() {
        let err = ServiceError::InvalidTransition {
            from: BookingStatus::Completed,
            to: BookingStatus::Cancelled,
        };
        assert_eq!(err.to_string(), "Cannot move booking from completed to cancelled");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}
