use async_trait::async_trait;
use serde_json::Value;

use crate::domain::page::PageResult;
use crate::domain::query::QueryState;
use crate::domain::types::EntityId;
use crate::repository::errors::RepositoryResult;

pub mod errors;
pub mod http;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

pub use http::HttpRepository;

/// Read side of a paginated resource.
///
/// The bearer token is supplied per call; repositories never store or
/// refresh credentials.
#[async_trait]
pub trait ResourceReader: Send + Sync {
    type Item: Clone + Send + Sync + 'static;

    async fn list_page(
        &self,
        token: &str,
        query: &QueryState,
    ) -> RepositoryResult<PageResult<Self::Item>>;
}

/// Write side of a paginated resource. Payloads arrive already validated
/// and serialized.
#[async_trait]
pub trait ResourceWriter: ResourceReader {
    async fn create_entity(&self, token: &str, payload: &Value) -> RepositoryResult<Self::Item>;

    async fn update_entity(
        &self,
        token: &str,
        id: EntityId,
        payload: &Value,
    ) -> RepositoryResult<Self::Item>;

    async fn delete_entity(&self, token: &str, id: EntityId) -> RepositoryResult<()>;
}
