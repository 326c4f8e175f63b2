//! Reactive render model published to the view layer.

use serde::Serialize;

use crate::domain::outcome::FailureKind;
use crate::domain::page::PageResult;
use crate::pagination::{PaginationCursor, PaginationView};
use crate::repository::errors::RepositoryError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Errored,
}

/// List-level error shown next to the retained items.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ViewError {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&RepositoryError> for ViewError {
    fn from(err: &RepositoryError) -> Self {
        Self {
            kind: err.failure_kind(),
            message: err.to_string(),
        }
    }
}

/// Snapshot of one list view.
///
/// Items of the last accepted page stay visible while a newer fetch is
/// outstanding and after a failed one.
#[derive(Clone, Debug)]
pub struct ListView<T> {
    pub status: LoadStatus,
    pub items: Vec<T>,
    pub cursor: Option<PaginationCursor>,
    pub error: Option<ViewError>,
}

impl<T> Default for ListView<T> {
    fn default() -> Self {
        Self {
            status: LoadStatus::Idle,
            items: Vec::new(),
            cursor: None,
            error: None,
        }
    }
}

impl<T> ListView<T> {
    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    /// Pagination render model; `None` while nothing is loaded or the list is
    /// empty.
    pub fn pagination(&self) -> Option<PaginationView> {
        self.cursor.as_ref().and_then(PaginationCursor::view)
    }

    pub(crate) fn start_loading(&mut self) {
        self.status = LoadStatus::Loading;
    }

    pub(crate) fn apply_page(&mut self, page: PageResult<T>) {
        self.cursor = Some(PaginationCursor::from_page(&page));
        self.items = page.items;
        self.error = None;
        self.status = LoadStatus::Loaded;
    }

    pub(crate) fn apply_error(&mut self, err: &RepositoryError) {
        self.error = Some(ViewError::from(err));
        self.status = LoadStatus::Errored;
    }
}
