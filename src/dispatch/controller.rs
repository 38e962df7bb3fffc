//! The contract between the dispatch pipeline and domain code.

use async_trait::async_trait;

use crate::dispatch::codec::{Filter, Model};
use crate::dispatch::error::DomainResult;
use crate::routing::Identifiers;

#[derive(Debug, Clone)]
pub struct CreateInput {
    pub identifiers: Identifiers,
    pub user_id: Option<String>,
    pub language: Option<String>,
    pub model: Model,
}

#[derive(Debug, Clone)]
pub struct ReadInput {
    pub identifiers: Identifiers,
    pub user_id: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateInput {
    pub identifiers: Identifiers,
    pub user_id: Option<String>,
    pub language: Option<String>,
    pub model: Model,
}

#[derive(Debug, Clone)]
pub struct DeleteInput {
    pub identifiers: Identifiers,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ListInput {
    pub identifiers: Identifiers,
    pub filter: Filter,
    pub sort_by: Vec<String>,
    pub page_index: Option<i64>,
    pub page_size: Option<i64>,
    pub user_id: Option<String>,
    pub language: Option<String>,
}

/// One page of a list result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Model>,
    pub page_count: u64,
    pub item_count: u64,
}

/// CRUD operations for one kind of resource.
///
/// Implementations decide persistence and business rules; the pipeline only
/// decides when each method is called and how its result is rendered.
#[async_trait]
pub trait Controller: Send + Sync {
    async fn create(&self, input: CreateInput) -> DomainResult<Model>;

    async fn read(&self, input: ReadInput) -> DomainResult<Model>;

    async fn update(&self, input: UpdateInput) -> DomainResult<Model>;

    async fn delete(&self, input: DeleteInput) -> DomainResult<()>;

    async fn list(&self, input: ListInput) -> DomainResult<Page>;
}
