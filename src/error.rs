//! # Error Handling
//!
//! Domain errors raised by the repository layer, plus their mapping onto
//! HTTP responses with a `{"message": "..."}` body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, RuntimeErr, SqlErr};
use serde_json::json;
use thiserror::Error;

/// Errors produced by repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// An operation required an existing match and found none.
    #[error("{record} not found for filters {{{filters}}}")]
    NotFound {
        record: &'static str,
        filters: String,
    },

    /// A write violated a uniqueness constraint.
    #[error("{record} already exists for input {{{input}}}")]
    AlreadyExists { record: &'static str, input: String },

    #[error("unknown field '{field}' on {record}")]
    UnknownField { record: &'static str, field: String },

    #[error("unknown filter operator '{operator}'")]
    UnknownOperator { operator: String },

    #[error("operator '{operator}' on field '{field}' expects {expected}")]
    InvalidOperand {
        field: String,
        operator: &'static str,
        expected: &'static str,
    },

    /// A conflict target does not correspond to any uniqueness constraint.
    #[error("no uniqueness constraint on {record} covers fields [{fields}]")]
    NoMatchingConstraint { record: &'static str, fields: String },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl RepositoryError {
    /// Translate a write error, turning unique violations into `AlreadyExists`.
    pub fn from_write_error(error: DbErr, record: &'static str, input: String) -> Self {
        if is_unique_violation(&error) {
            tracing::debug!(?error, record, "Unique constraint violation detected");
            return Self::AlreadyExists { record, input };
        }
        Self::Database(error)
    }

    /// Build a validation error from any message.
    pub fn validation_error<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// HTTP status the error maps to at the API boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RepositoryError::NotFound { .. } => StatusCode::NOT_FOUND,
            RepositoryError::AlreadyExists { .. } => StatusCode::CONFLICT,
            RepositoryError::UnknownField { .. }
            | RepositoryError::UnknownOperator { .. }
            | RepositoryError::InvalidOperand { .. }
            | RepositoryError::NoMatchingConstraint { .. }
            | RepositoryError::Validation(_) => StatusCode::BAD_REQUEST,
            RepositoryError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RepositoryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            RepositoryError::Database(error) => {
                tracing::error!(?error, "Database error reached the API boundary");
                "Database error occurred".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Returns true when the engine rejected a write because of a unique constraint.
pub fn is_unique_violation(error: &DbErr) -> bool {
    const PG_UNIQUE: &str = "23505";
    const MYSQL_DUPLICATE_CODES: &[&str] = &["1022", "1062", "1169", "1586"];
    const SQLITE_DUPLICATE_CODES: &[&str] = &["1555", "2067"];

    if matches!(error.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return true;
    }

    let runtime_err = match error {
        DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
        | DbErr::Exec(RuntimeErr::SqlxError(sqlx_err)) => sqlx_err,
        _ => return false,
    };

    let Some(db_error) = runtime_err.as_database_error() else {
        return false;
    };

    if db_error.is_unique_violation() {
        return true;
    }

    db_error.code().is_some_and(|code| {
        let code: &str = code.as_ref();
        code == PG_UNIQUE
            || MYSQL_DUPLICATE_CODES.contains(&code)
            || SQLITE_DUPLICATE_CODES.contains(&code)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        let not_found = RepositoryError::NotFound {
            record: "Sensor",
            filters: "name=temp1".to_string(),
        };
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let exists = RepositoryError::AlreadyExists {
            record: "Sensor",
            input: "name=temp1".to_string(),
        };
        assert_eq!(exists.status_code(), StatusCode::CONFLICT);

        let unknown_field = RepositoryError::UnknownField {
            record: "Sensor",
            field: "colour".to_string(),
        };
        assert_eq!(unknown_field.status_code(), StatusCode::BAD_REQUEST);

        let unknown_operator = RepositoryError::UnknownOperator {
            operator: "between".to_string(),
        };
        assert_eq!(unknown_operator.status_code(), StatusCode::BAD_REQUEST);

        let db = RepositoryError::Database(DbErr::Custom("boom".to_string()));
        assert_eq!(db.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_messages_name_the_record() {
        let error = RepositoryError::NotFound {
            record: "OpcServer",
            filters: "name=plant-a".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "OpcServer not found for filters {name=plant-a}"
        );
    }

    #[test]
    fn test_response_body_has_message() {
        let response = RepositoryError::AlreadyExists {
            record: "Organization",
            input: "name=acme".to_string(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_database_response_hides_details() {
        let response =
            RepositoryError::Database(DbErr::Custom("secret detail".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_write_error_passthrough() {
        let error = RepositoryError::from_write_error(
            DbErr::Custom("x".to_string()),
            "Sensor",
            "name=temp1".to_string(),
        );
        assert!(matches!(error, RepositoryError::Database(_)));
    }

    #[test]
    fn test_custom_error_is_not_unique_violation() {
        assert!(!is_unique_violation(&DbErr::Custom("x".to_string())));
        assert!(!is_unique_violation(&DbErr::RecordNotFound("x".to_string())));
    }
}
