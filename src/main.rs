use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use restgate::config::Config;
use restgate::dispatch::codec::Model;
use restgate::dispatch::controller::{
    Controller, CreateInput, DeleteInput, ListInput, Page, ReadInput, UpdateInput,
};
use restgate::dispatch::error::{DomainError, DomainResult};
use restgate::dispatch::Pipeline;
use restgate::inspect::{Normalizer, PrevalidationFormat, Prevalidator, Validator};
use restgate::routing::{Identifiers, RouteTable};
use restgate::server;

const DEFAULT_PAGE_SIZE: i64 = 15;

/// In-memory cat registry served at `/cat` and `/cat/{id}`.
#[derive(Default)]
struct CatStore {
    next_id: AtomicU64,
    cats: RwLock<BTreeMap<u64, Model>>,
}

impl CatStore {
    fn id(identifiers: &Identifiers) -> DomainResult<u64> {
        identifiers
            .get("id")
            .and_then(|id| id.parse().ok())
            .ok_or_else(|| DomainError::not_found("cat not found"))
    }
}

#[async_trait]
impl Controller for CatStore {
    async fn create(&self, input: CreateInput) -> DomainResult<Model> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let mut model = input.model;
        model.insert("id".to_string(), Value::from(id));

        self.cats.write().await.insert(id, model.clone());
        Ok(model)
    }

    async fn read(&self, input: ReadInput) -> DomainResult<Model> {
        let id = Self::id(&input.identifiers)?;
        self.cats
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("cat not found"))
    }

    async fn update(&self, input: UpdateInput) -> DomainResult<Model> {
        let id = Self::id(&input.identifiers)?;
        let mut cats = self.cats.write().await;
        let slot = cats
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("cat not found"))?;

        let mut model = input.model;
        model.insert("id".to_string(), Value::from(id));
        *slot = model.clone();
        Ok(model)
    }

    async fn delete(&self, input: DeleteInput) -> DomainResult<()> {
        let id = Self::id(&input.identifiers)?;
        self.cats
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("cat not found"))
    }

    async fn list(&self, input: ListInput) -> DomainResult<Page> {
        let cats = self.cats.read().await;
        let matching: Vec<&Model> = cats
            .values()
            .filter(|cat| match input.filter.get("name") {
                Some(name) => cat.get("name") == Some(name),
                None => true,
            })
            .collect();

        let page_size = input.page_size.filter(|s| *s > 0).unwrap_or(DEFAULT_PAGE_SIZE) as usize;
        let page_index = input.page_index.filter(|i| *i > 0).unwrap_or(1) as usize;
        let item_count = matching.len();
        // Out-of-range pages come back empty.
        let offset = (page_index - 1).saturating_mul(page_size);

        Ok(Page {
            items: matching
                .into_iter()
                .skip(offset)
                .take(page_size)
                .cloned()
                .collect(),
            page_count: item_count.div_ceil(page_size) as u64,
            item_count: item_count as u64,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::load()?;

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(cfg.log_level())
        .init();

    let pipeline = Pipeline::new(CatStore::default())
        .prevalidate(Prevalidator::new(PrevalidationFormat::Ncode))
        .validate(
            Validator::new()
                .not_empty("name", "empty name")
                .is_string("name", "name must be a string")
                .must_length("name", 1, 64, "name must have 1 to 64 characters")
                .is_int("age", "age must be an integer"),
        )
        .normalize(Normalizer::new().as_string("name"))
        .invoke_timeout(cfg.invoke_timeout());

    let mut table = RouteTable::new();
    table.subscribe_resource("cat", pipeline)?;
    let table = Arc::new(table);

    tokio::select! {
        res = server::listener::run(&cfg, table) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
