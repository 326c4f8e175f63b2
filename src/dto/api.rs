//! Wire shapes of the consumed resource API.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::page::{PageMeta, PageResult};
use crate::domain::query::QueryState;
use crate::repository::errors::RepositoryError;

/// Body returned by list endpoints.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    pub data: Vec<T>,
    #[serde(default)]
    pub links: Links,
    pub meta: PageMeta,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub prev: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

/// Error body returned by mutation endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct MutationErrorBody {
    #[serde(default)]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Entity returned by a mutation endpoint, either bare or wrapped in `data`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EntityBody<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> EntityBody<T> {
    pub fn into_inner(self) -> T {
        match self {
            EntityBody::Wrapped { data } => data,
            EntityBody::Bare(entity) => entity,
        }
    }
}

/// Query string embedded in pagination links.
#[derive(Debug, Deserialize)]
pub struct PageLinkQuery {
    pub page: Option<usize>,
}

impl<T> TryFrom<ListResponse<T>> for PageResult<T> {
    type Error = RepositoryError;

    fn try_from(response: ListResponse<T>) -> Result<Self, Self::Error> {
        if !response.success {
            return Err(RepositoryError::Server {
                status: 200,
                message: "list request was not successful".to_string(),
            });
        }
        let meta = response.meta;
        if meta.per_page > 0 && response.data.len() > meta.per_page {
            return Err(RepositoryError::Decode(format!(
                "page holds {} items but per_page is {}",
                response.data.len(),
                meta.per_page
            )));
        }
        // A page requested past the end is reported as such, not rejected;
        // the controller moves back to the last page.
        if meta.total > 0 && meta.current_page > meta.last_page && !response.data.is_empty() {
            return Err(RepositoryError::Decode(format!(
                "current page {} exceeds last page {}",
                meta.current_page, meta.last_page
            )));
        }
        Ok(PageResult {
            items: response.data,
            meta,
            next_link: response.links.next.filter(|l| !l.trim().is_empty()),
            prev_link: response.links.prev.filter(|l| !l.trim().is_empty()),
        })
    }
}

/// Query parameters for a list request: `page`, one parameter per search
/// field, `status`, `sort_by` and `sort_dir`.
pub fn list_params(query: &QueryState) -> Vec<(String, String)> {
    let mut params = vec![("page".to_string(), query.page().to_string())];
    params.extend(
        query
            .search_terms()
            .map(|(field, term)| (field.as_str().to_string(), term.to_string())),
    );
    if let Some(status) = query.status_filter() {
        params.push(("status".to_string(), status.as_str().to_string()));
    }
    if let Some(key) = query.sort_key() {
        params.push(("sort_by".to_string(), key.as_str().to_string()));
        params.push((
            "sort_dir".to_string(),
            query.sort_direction().as_param().to_string(),
        ));
    }
    params
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::types::{FieldName, SortKey, StatusFilter};

    #[test]
    fn list_params_include_only_committed_criteria() {
        let mut query = QueryState::default();
        assert_eq!(list_params(&query), vec![("page".into(), "1".into())]);

        query.set_search(FieldName::new("search").expect("field"), "anna");
        query.set_filter(Some(StatusFilter::new("active").expect("status")));
        query.toggle_sort(SortKey::new("name").expect("key"));
        query.toggle_sort(SortKey::new("name").expect("key"));
        query.set_page(2).expect("page");

        assert_eq!(
            list_params(&query),
            vec![
                ("page".to_string(), "2".to_string()),
                ("search".to_string(), "anna".to_string()),
                ("status".to_string(), "active".to_string()),
                ("sort_by".to_string(), "name".to_string()),
                ("sort_dir".to_string(), "desc".to_string()),
            ]
        );
    }

    #[test]
    fn list_response_converts_to_page() {
        let response: ListResponse<serde_json::Value> = serde_json::from_value(json!({
            "success": true,
            "data": [{"id": 1}, {"id": 2}],
            "links": {"prev": null, "next": "/api/categories?page=2"},
            "meta": {"current_page": 1, "last_page": 2, "per_page": 2, "total": 3, "from": 1, "to": 2}
        }))
        .expect("valid body");

        let page = PageResult::try_from(response).expect("valid page");
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_link.as_deref(), Some("/api/categories?page=2"));
        assert!(page.prev_link.is_none());
    }

    #[test]
    fn entity_body_accepts_bare_and_wrapped_shapes() {
        let bare: EntityBody<serde_json::Value> =
            serde_json::from_value(json!({"id": 3, "name": "Toys"})).expect("bare body");
        assert_eq!(bare.into_inner()["name"], json!("Toys"));

        let wrapped: EntityBody<serde_json::Value> =
            serde_json::from_value(json!({"success": true, "data": {"id": 3}}))
                .expect("wrapped body");
        assert_eq!(wrapped.into_inner(), json!({"id": 3}));
    }

    #[test]
    fn oversized_page_is_rejected() {
        let response: ListResponse<serde_json::Value> = serde_json::from_value(json!({
            "data": [{"id": 1}, {"id": 2}],
            "meta": {"current_page": 1, "last_page": 1, "per_page": 1, "total": 2}
        }))
        .expect("valid body");

        assert!(matches!(
            PageResult::try_from(response),
            Err(RepositoryError::Decode(_))
        ));
    }

    #[test]
    fn unsuccessful_list_is_a_server_error() {
        let response: ListResponse<serde_json::Value> = serde_json::from_value(json!({
            "success": false,
            "data": [],
            "meta": {"current_page": 1, "last_page": 1, "per_page": 25, "total": 0}
        }))
        .expect("valid body");

        assert!(matches!(
            PageResult::try_from(response),
            Err(RepositoryError::Server { .. })
        ));
    }
}
