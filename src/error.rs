//! Defines the app level error type and its conversion to JSON HTTP
//! responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

/// A single field-level validation failure.
///
/// A failed write request carries one of these per offending field so the
/// client can surface the message next to the right form input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// The JSON field that failed validation.
    pub field: &'static str,
    /// A human-readable description of the failure.
    pub message: String,
}

impl FieldError {
    /// Create a field error for `field` with `message`.
    pub fn new(field: &'static str, message: &str) -> Self {
        Self {
            field,
            message: message.to_owned(),
        }
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request body or query parameters failed validation.
    ///
    /// Carries one entry per offending field.
    #[error("invalid input data")]
    InvalidInput(Vec<FieldError>),

    /// The category name used to create or update a category already exists
    /// in the database.
    #[error("the category name already exists in the database")]
    DuplicateCategoryName,

    /// The category ID used to create or update an expense did not match an
    /// existing category.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory,

    /// Tried to read, update or delete a category that does not exist.
    #[error("the category could not be found")]
    CategoryNotFound,

    /// Tried to read, update or delete an expense that does not exist.
    #[error("the expense could not be found")]
    ExpenseNotFound,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A timestamp could not be formatted for storage.
    #[error("could not format timestamp: {0}")]
    TimestampFormat(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_))
                if sql_error.extended_code == 787 =>
            {
                Error::InvalidCategory
            }
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("category.name") =>
            {
                Error::DuplicateCategoryName
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status_code, body) = match self {
            Error::InvalidInput(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid input data", "details": details }),
            ),
            Error::InvalidCategory => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid category ID" }),
            ),
            Error::DuplicateCategoryName => (
                StatusCode::CONFLICT,
                json!({ "error": "Category name already exists" }),
            ),
            Error::CategoryNotFound => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Category not found" }),
            ),
            Error::ExpenseNotFound => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Expense not found" }),
            ),
            Error::NotFound => (StatusCode::NOT_FOUND, json!({ "error": "Route not found" })),
            // Any errors that are not handled above are not intended to be
            // shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status_code, Json(body)).into_response()
    }
}
