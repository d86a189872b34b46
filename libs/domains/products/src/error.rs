use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use mongodb::error::{CommandError, ErrorKind, WriteError, WriteFailure};
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(Uuid),

    #[error("Product code '{0}' already exists")]
    DuplicateCode(String),

    #[error("Invalid product: {0}")]
    Validation(ValidationErrors),

    /// Malformed form data or a rejected image
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl From<ValidationErrors> for ProductError {
    fn from(errors: ValidationErrors) -> Self {
        ProductError::Validation(errors)
    }
}

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(_) => AppError::NotFound("Product not found".to_string()),
            ProductError::DuplicateCode(code) => {
                AppError::Conflict(format!("Product code '{}' already exists", code))
            }
            ProductError::Validation(errors) => AppError::ValidationError(errors),
            ProductError::InvalidRequest(msg) => AppError::BadRequest(msg),
            ProductError::StoreUnavailable(msg) => AppError::ServiceUnavailable(msg),
            ProductError::Database(msg) => AppError::Database(msg),
            ProductError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for ProductError {
    fn from(err: mongodb::error::Error) -> Self {
        match *err.kind {
            ErrorKind::ServerSelection { .. } => ProductError::StoreUnavailable(err.to_string()),
            _ => ProductError::Database(err.to_string()),
        }
    }
}

impl From<std::io::Error> for ProductError {
    fn from(err: std::io::Error) -> Self {
        ProductError::Internal(err.to_string())
    }
}

/// Whether the driver error is a unique index violation.
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(WriteError { code, .. })) => {
            *code == DUPLICATE_KEY
        }
        ErrorKind::Command(CommandError { code, .. }) => *code == DUPLICATE_KEY,
        _ => false,
    }
}
