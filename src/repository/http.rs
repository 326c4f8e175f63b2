//! Resource repository backed by the REST API.

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::domain::outcome::FieldErrors;
use crate::domain::page::PageResult;
use crate::domain::query::QueryState;
use crate::domain::resource::ResourceDescriptor;
use crate::domain::types::EntityId;
use crate::dto::api::{EntityBody, ListResponse, MutationErrorBody, list_params};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{ResourceReader, ResourceWriter};

/// Talks to one resource collection, e.g. `{base}/categories`.
pub struct HttpRepository<T> {
    client: reqwest::Client,
    base_url: Url,
    resource: ResourceDescriptor,
    _item: PhantomData<fn() -> T>,
}

impl<T> Clone for HttpRepository<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            resource: self.resource.clone(),
            _item: PhantomData,
        }
    }
}

impl<T> HttpRepository<T> {
    pub fn new(
        base_url: &str,
        resource: ResourceDescriptor,
        timeout: Duration,
    ) -> RepositoryResult<Self> {
        let mut base_url = Url::parse(base_url.trim())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                RepositoryError::Transport(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url,
            resource,
            _item: PhantomData,
        })
    }

    pub fn resource(&self) -> &ResourceDescriptor {
        &self.resource
    }

    pub fn collection_url(&self) -> RepositoryResult<Url> {
        Ok(self.base_url.join(self.resource.path())?)
    }

    pub fn entity_url(&self, id: EntityId) -> RepositoryResult<Url> {
        Ok(self
            .base_url
            .join(&format!("{}/{}", self.resource.path(), id))?)
    }
}

/// Classifies a non-success response body.
///
/// A 422 carries a field-indexed error map; everything else collapses into a
/// single message.
pub fn classify_failure(status: StatusCode, body: &str) -> RepositoryError {
    let parsed: MutationErrorBody = serde_json::from_str(body).unwrap_or_default();

    if status == StatusCode::UNPROCESSABLE_ENTITY {
        return RepositoryError::Validation {
            field_errors: parsed.errors.map(FieldErrors::from).unwrap_or_default(),
            message: parsed.message,
        };
    }

    let message = parsed.message.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    RepositoryError::from_status(status, message)
}

async fn ensure_success(response: Response) -> RepositoryResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();
    let err = classify_failure(status, &body);
    log::warn!("Request to {url} failed: {err}");
    Err(err)
}

#[async_trait]
impl<T> ResourceReader for HttpRepository<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Item = T;

    async fn list_page(&self, token: &str, query: &QueryState) -> RepositoryResult<PageResult<T>> {
        let url = self.collection_url()?;
        let params = list_params(query);
        log::debug!("GET {url} {params:?}");

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&params)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body: ListResponse<T> = response.json().await?;

        PageResult::try_from(body)
    }
}

#[async_trait]
impl<T> ResourceWriter for HttpRepository<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    async fn create_entity(&self, token: &str, payload: &Value) -> RepositoryResult<T> {
        let url = self.collection_url()?;
        log::debug!("POST {url}");

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(payload)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body: EntityBody<T> = response.json().await?;

        Ok(body.into_inner())
    }

    async fn update_entity(&self, token: &str, id: EntityId, payload: &Value) -> RepositoryResult<T> {
        let url = self.entity_url(id)?;
        log::debug!("PUT {url}");

        let response = self
            .client
            .put(url)
            .bearer_auth(token)
            .json(payload)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body: EntityBody<T> = response.json().await?;

        Ok(body.into_inner())
    }

    async fn delete_entity(&self, token: &str, id: EntityId) -> RepositoryResult<()> {
        let url = self.entity_url(id)?;
        log::debug!("DELETE {url}");

        let response = self.client.delete(url).bearer_auth(token).send().await?;
        ensure_success(response).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Record;

    fn repo(base: &str) -> HttpRepository<Record> {
        HttpRepository::new(base, ResourceDescriptor::categories(), Duration::from_secs(5))
            .expect("valid repository")
    }

    #[test]
    fn urls_join_under_the_base_path() {
        let repo = repo("https://shop.example.com/api/admin");
        assert_eq!(
            repo.collection_url().expect("url").as_str(),
            "https://shop.example.com/api/admin/categories"
        );
        let id = EntityId::new(42).expect("valid id");
        assert_eq!(
            repo.entity_url(id).expect("url").as_str(),
            "https://shop.example.com/api/admin/categories/42"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = HttpRepository::<Record>::new(
            "not a url",
            ResourceDescriptor::categories(),
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(RepositoryError::Transport(_))));
    }

    #[test]
    fn unprocessable_entity_yields_field_errors() {
        let err = classify_failure(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message":"The given data was invalid.","errors":{"name":["required"]}}"#,
        );
        match err {
            RepositoryError::Validation {
                field_errors,
                message,
            } => {
                assert_eq!(field_errors.get("name"), Some(&["required".to_string()][..]));
                assert_eq!(message.as_deref(), Some("The given data was invalid."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn other_failures_collapse_into_one_message() {
        let err = classify_failure(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert!(matches!(
            err,
            RepositoryError::Server { status: 500, ref message } if message == "Internal Server Error"
        ));

        let err = classify_failure(StatusCode::UNAUTHORIZED, r#"{"message":"Token expired"}"#);
        assert!(matches!(err, RepositoryError::Unauthorized(ref m) if m == "Token expired"));
    }
}
