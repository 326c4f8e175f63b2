use serde::{Deserialize, Serialize};

/// Pagination metadata reported by the resource API.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub current_page: usize,
    pub last_page: usize,
    pub per_page: usize,
    pub total: usize,
    /// One-based index of the first row on the page, absent for empty pages.
    #[serde(default)]
    pub from: Option<usize>,
    #[serde(default)]
    pub to: Option<usize>,
}

/// One page of items plus the links needed to move between pages.
///
/// Always replaces its predecessor wholesale; pages are never merged.
#[derive(Clone, Debug, PartialEq)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
    pub next_link: Option<String>,
    pub prev_link: Option<String>,
}

impl<T> PageResult<T> {
    pub fn total_count(&self) -> usize {
        self.meta.total
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True for an empty page requested past the end of a non-empty list.
    pub fn is_beyond_last_page(&self) -> bool {
        self.items.is_empty() && self.meta.total > 0 && self.meta.current_page > self.meta.last_page
    }
}
