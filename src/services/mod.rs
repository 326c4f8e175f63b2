//! Components of the paginated list controller.

use thiserror::Error;

use crate::domain::types::TypeConstraintError;
use crate::pagination::Direction;

pub mod confirmation;
pub mod controller;
pub mod debounce;
pub mod fetch;
pub mod mutation;
pub mod view;

/// Errors returned by the controller's imperative methods.
///
/// These reject calls the view should never make (unknown names, disabled
/// controls); network failures are reported through view state and
/// [`crate::domain::outcome::MutationOutcome`] instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("unknown search field: {0}")]
    UnknownSearchField(String),

    #[error("unknown sort key: {0}")]
    UnknownSortKey(String),

    #[error("unknown status: {0}")]
    UnknownStatus(String),

    #[error("page {page} is outside 1..={last_page}")]
    PageOutOfRange { page: usize, last_page: usize },

    #[error("no {0:?} page to navigate to")]
    NavigationUnavailable(Direction),

    #[error("list view is not active")]
    Inactive,

    #[error(transparent)]
    TypeConstraint(#[from] TypeConstraintError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
