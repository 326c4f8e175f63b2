//! Committed search, filter, sort and page criteria for one list view.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::types::{FieldName, SortKey, StatusFilter, TypeConstraintError};

/// Direction of the server-side sort.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    /// Value of the `sort_dir` query parameter.
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Criteria driving the next list fetch.
///
/// Every mutator returns whether the state actually changed so the caller
/// dispatches a fetch only for real changes. Any change to search, filter or
/// sort resets `page` to 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryState {
    search_terms: BTreeMap<FieldName, String>,
    status_filter: Option<StatusFilter>,
    sort_key: Option<SortKey>,
    sort_direction: SortDirection,
    page: usize,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search_terms: BTreeMap::new(),
            status_filter: None,
            sort_key: None,
            sort_direction: SortDirection::Ascending,
            page: 1,
        }
    }
}

impl QueryState {
    pub fn search_term(&self, field: &FieldName) -> Option<&str> {
        self.search_terms.get(field).map(String::as_str)
    }

    /// Non-empty search terms in field order.
    pub fn search_terms(&self) -> impl Iterator<Item = (&FieldName, &str)> {
        self.search_terms
            .iter()
            .map(|(field, term)| (field, term.as_str()))
    }

    pub fn status_filter(&self) -> Option<&StatusFilter> {
        self.status_filter.as_ref()
    }

    pub fn sort_key(&self) -> Option<&SortKey> {
        self.sort_key.as_ref()
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Commits a search term. Whitespace-only terms clear the field.
    pub fn set_search(&mut self, field: FieldName, value: &str) -> bool {
        let term = value.trim();
        let changed = if term.is_empty() {
            self.search_terms.remove(&field).is_some()
        } else if self.search_term(&field) == Some(term) {
            false
        } else {
            self.search_terms.insert(field, term.to_string());
            true
        };
        if changed {
            self.page = 1;
        }
        changed
    }

    /// Selects a sort key; reselecting the current key flips the direction.
    pub fn toggle_sort(&mut self, key: SortKey) -> bool {
        if self.sort_key.as_ref() == Some(&key) {
            self.sort_direction = self.sort_direction.toggled();
        } else {
            self.sort_key = Some(key);
            self.sort_direction = SortDirection::Ascending;
        }
        self.page = 1;
        true
    }

    pub fn set_filter(&mut self, status: Option<StatusFilter>) -> bool {
        if self.status_filter == status {
            return false;
        }
        self.status_filter = status;
        self.page = 1;
        true
    }

    pub fn set_page(&mut self, page: usize) -> Result<bool, TypeConstraintError> {
        if page == 0 {
            return Err(TypeConstraintError::ZeroPage);
        }
        let changed = self.page != page;
        self.page = page;
        Ok(changed)
    }
}
