//! Page navigation derived from server-provided links and metadata.

use serde::Serialize;

use crate::domain::page::{PageMeta, PageResult};
use crate::dto::api::PageLinkQuery;

fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = (current_page + right_current + 1).min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

/// Extracts the `page` query parameter from a pagination link.
///
/// Links may be absolute or relative; only the query string is inspected.
pub fn page_from_link(link: &str) -> Option<usize> {
    let without_fragment = link.split('#').next().unwrap_or_default();
    let (_, query) = without_fragment.split_once('?')?;
    serde_html_form::from_str::<PageLinkQuery>(query)
        .ok()?
        .page
        .filter(|page| *page > 0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Previous,
    Next,
}

/// Navigation state for the currently displayed page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaginationCursor {
    meta: PageMeta,
    prev_page: Option<usize>,
    next_page: Option<usize>,
}

impl PaginationCursor {
    pub fn from_page<T>(page: &PageResult<T>) -> Self {
        Self {
            meta: page.meta.clone(),
            prev_page: page.prev_link.as_deref().and_then(page_from_link),
            next_page: page.next_link.as_deref().and_then(page_from_link),
        }
    }

    pub fn meta(&self) -> &PageMeta {
        &self.meta
    }

    /// Empty lists render no pagination control at all.
    pub fn is_visible(&self) -> bool {
        self.meta.total > 0
    }

    /// Page a direction control leads to. `None` means the control is
    /// disabled: the link is absent or carries no usable page number.
    pub fn target(&self, direction: Direction) -> Option<usize> {
        match direction {
            Direction::Previous => self.prev_page,
            Direction::Next => self.next_page,
        }
    }

    pub fn contains(&self, page: usize) -> bool {
        page >= 1 && page <= self.meta.last_page
    }

    pub fn label(&self) -> String {
        format!("Page {} of {}", self.meta.current_page, self.meta.last_page)
    }

    pub fn summary(&self) -> String {
        match (self.meta.from, self.meta.to) {
            (Some(from), Some(to)) => {
                format!("Showing {from} to {to} of {} results", self.meta.total)
            }
            _ => format!("{} results", self.meta.total),
        }
    }

    /// Numbered page window; `None` marks a gap.
    pub fn pages(&self) -> Vec<Option<usize>> {
        get_pages(self.meta.last_page, self.meta.current_page.max(1), 2, 2, 4, 2)
    }

    /// Render model for the view layer, `None` when the control is hidden.
    pub fn view(&self) -> Option<PaginationView> {
        if !self.is_visible() {
            return None;
        }
        Some(PaginationView {
            label: self.label(),
            summary: self.summary(),
            current_page: self.meta.current_page,
            last_page: self.meta.last_page,
            pages: self.pages(),
            prev_page: self.prev_page,
            next_page: self.next_page,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PaginationView {
    pub label: String,
    pub summary: String,
    pub current_page: usize,
    pub last_page: usize,
    pub pages: Vec<Option<usize>>,
    pub prev_page: Option<usize>,
    pub next_page: Option<usize>,
}
