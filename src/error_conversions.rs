//! Error conversion glue between layers.
//!
//! The domain layer must not depend on repository or form error types, so
//! the mappings into [`MutationOutcome`] live here.

use crate::domain::outcome::{FailureKind, FieldErrors, MutationOutcome};
use crate::forms::FormError;
use crate::repository::errors::RepositoryError;

impl<T> From<RepositoryError> for MutationOutcome<T> {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Validation {
                field_errors,
                message,
            } => MutationOutcome::ValidationFailure {
                field_errors,
                message,
            },
            other => MutationOutcome::TransportFailure {
                kind: other.failure_kind(),
                message: other.to_string(),
            },
        }
    }
}

impl<T> From<FormError> for MutationOutcome<T> {
    fn from(err: FormError) -> Self {
        match err {
            FormError::Validation(errors) => MutationOutcome::ValidationFailure {
                field_errors: FieldErrors::from(&errors),
                message: None,
            },
            FormError::Encoding(err) => MutationOutcome::TransportFailure {
                kind: FailureKind::Transport,
                message: format!("Payload could not be encoded: {err}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn validation_errors_keep_field_map() {
        let field_errors =
            FieldErrors::from(BTreeMap::from([("name".to_string(), vec!["required".to_string()])]));
        let outcome: MutationOutcome<()> = RepositoryError::Validation {
            field_errors: field_errors.clone(),
            message: Some("The given data was invalid.".into()),
        }
        .into();

        assert_eq!(
            outcome,
            MutationOutcome::ValidationFailure {
                field_errors,
                message: Some("The given data was invalid.".into()),
            }
        );
    }

    #[test]
    fn other_failures_are_classified() {
        let not_found: MutationOutcome<()> = RepositoryError::NotFound.into();
        let missing: MutationOutcome<()> = RepositoryError::Unauthenticated.into();
        let server: MutationOutcome<()> = RepositoryError::Server {
            status: 500,
            message: "boom".into(),
        }
        .into();

        assert!(matches!(
            not_found,
            MutationOutcome::TransportFailure { kind: FailureKind::StaleTarget, .. }
        ));
        assert!(matches!(
            missing,
            MutationOutcome::TransportFailure { kind: FailureKind::Auth, .. }
        ));
        assert!(matches!(
            server,
            MutationOutcome::TransportFailure { kind: FailureKind::Transport, .. }
        ));
    }
}
