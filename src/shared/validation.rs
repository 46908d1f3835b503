//! Request Validation
//!
//! Bridges `validator` derive failures into the API error body. Handlers
//! call `body.validate().map_err(validation_error)?` before touching a
//! service.

use validator::ValidationErrors;

use super::error::{AppError, FieldError};

/// Flatten derive-produced validation errors into a single AppError.
///
/// The first failing field becomes the response message; a rule without
/// a custom message falls back to "invalid value".
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let mut field_errors: Vec<FieldError> = Vec::new();
    for (field, errs) in errors.field_errors() {
        for err in errs {
            let message = match &err.message {
                Some(msg) => msg.to_string(),
                None => "invalid value".to_string(),
            };
            field_errors.push(FieldError {
                field: field.to_string(),
                message,
            });
        }
    }

    let message = match field_errors.first() {
        Some(e) => format!("{}: {}", e.field, e.message),
        None => "Validation failed".to_string(),
    };

    AppError::Validation(message)
}
