//! Client-side validated payloads submitted from the create/edit modals.

use std::borrow::Cow;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::outcome::FieldErrors;

pub mod category;
pub mod customer;

#[derive(Debug, Error)]
/// Errors that can occur when preparing form data for submission.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("payload could not be encoded: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut field_errors = FieldErrors::new();
        for (field, errors) in errors.field_errors() {
            for error in errors {
                let message = error
                    .message
                    .clone()
                    .unwrap_or_else(|| Cow::Owned(error.code.to_string()));
                field_errors.push(field.to_string(), message.into_owned());
            }
        }
        field_errors
    }
}

/// Validates a payload and encodes it as the JSON request body.
pub fn prepare_payload<P>(payload: &P) -> Result<Value, FormError>
where
    P: Serialize + Validate,
{
    payload.validate()?;
    Ok(serde_json::to_value(payload)?)
}

/// Trims a free-text input, mapping blank values to `None`.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
