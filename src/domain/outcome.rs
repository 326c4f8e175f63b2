//! Results of create/update/delete calls as seen by the view.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-input validation messages keyed by field name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Adds a message for `field`, keeping earlier messages.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Replaces the messages of every field present in `other`; fields not
    /// mentioned there keep their current messages.
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            if messages.is_empty() {
                self.0.remove(&field);
            } else {
                self.0.insert(field, messages);
            }
        }
    }

    /// Drops the messages of one field. Returns whether anything was removed.
    pub fn clear_field(&mut self, field: &str) -> bool {
        self.0.remove(field).is_some()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl From<BTreeMap<String, Vec<String>>> for FieldErrors {
    fn from(value: BTreeMap<String, Vec<String>>) -> Self {
        Self(value.into_iter().filter(|(_, m)| !m.is_empty()).collect())
    }
}

/// Class of a non-validation failure, deciding which affordance the UI shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Network, timeout or server failure; retrying may succeed.
    Transport,
    /// Missing or rejected credentials; retry requires re-authentication.
    Auth,
    /// The targeted row no longer exists; the list is refetched.
    StaleTarget,
}

/// Discriminated result of a mutation. Mutations never return `Err`.
#[derive(Clone, Debug, PartialEq)]
pub enum MutationOutcome<T> {
    Success(T),
    ValidationFailure {
        field_errors: FieldErrors,
        message: Option<String>,
    },
    TransportFailure {
        kind: FailureKind,
        message: String,
    },
}

impl<T> MutationOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Maps the success payload, keeping the failure classification.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> MutationOutcome<U> {
        match self {
            Self::Success(value) => MutationOutcome::Success(f(value)),
            Self::ValidationFailure {
                field_errors,
                message,
            } => MutationOutcome::ValidationFailure {
                field_errors,
                message,
            },
            Self::TransportFailure { kind, message } => {
                MutationOutcome::TransportFailure { kind, message }
            }
        }
    }
}
