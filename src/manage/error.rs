use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error types for entity management operations
#[derive(Debug, thiserror::Error)]
pub enum ManageError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("{resource} with id {id} not found")]
    NotFound { resource: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl ManageError {
    /// Shorthand for a not-found error
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        ManageError::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

impl From<sqlx::Error> for ManageError {
    fn from(err: sqlx::Error) -> Self {
        ManageError::DatabaseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ManageError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ManageError::ValidationError(errors.to_string())
    }
}

impl IntoResponse for ManageError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ManageError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            ManageError::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                format!("{} with id {} not found", resource, id),
            ),
            ManageError::Conflict(msg) => {
                tracing::warn!("Conflict: {}", msg);
                (StatusCode::CONFLICT, msg)
            }
            ManageError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
