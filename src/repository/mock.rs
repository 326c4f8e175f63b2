//! Mock repository implementations for isolating services in tests.

use async_trait::async_trait;
use mockall::mock;
use serde_json::Value;

use crate::domain::entity::Record;
use crate::domain::page::PageResult;
use crate::domain::query::QueryState;
use crate::domain::types::EntityId;
use crate::repository::errors::RepositoryResult;
use crate::repository::{ResourceReader, ResourceWriter};

mock! {
    pub Repository {}

    #[async_trait]
    impl ResourceReader for Repository {
        type Item = Record;

        async fn list_page(
            &self,
            token: &str,
            query: &QueryState,
        ) -> RepositoryResult<PageResult<Record>>;
    }

    #[async_trait]
    impl ResourceWriter for Repository {
        async fn create_entity(&self, token: &str, payload: &Value) -> RepositoryResult<Record>;
        async fn update_entity(
            &self,
            token: &str,
            id: EntityId,
            payload: &Value,
        ) -> RepositoryResult<Record>;
        async fn delete_entity(&self, token: &str, id: EntityId) -> RepositoryResult<()>;
    }
}
