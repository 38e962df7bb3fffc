//! The request lifecycle for resource routes.
//!
//! ```text
//!   Start ─► Authorizing ─► Prevalidating ─► Validating ─► Invoking ─► Mapping ─► Done
//!               │               │                │             │
//!               └── 401 ────────┴── 400 ─────────┴─────────────┴──────────────► Done
//! ```
//!
//! Each operation kind runs the subset of stages it needs, and any stage can
//! end the run early. The outcome is produced exactly once.
//!
//! - Authorization always runs first, so a request that is both
//!   unauthorized and invalid gets 401.
//! - Create and Update merge the prevalidation message after the body
//!   validation messages into one 400.
//! - Read, Delete, List and PartialUpdate have no body to validate before
//!   the controller call, so a prevalidation failure is reported alone.
//! - PartialUpdate reads the current model, merges the request body over
//!   it, validates the merged model and only then updates.
//! - List replaces validation with filter normalization, which never fails.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::dispatch::Respond;
use crate::dispatch::codec::Model;
use crate::dispatch::controller::{
    Controller, CreateInput, DeleteInput, ListInput, ReadInput, UpdateInput,
};
use crate::dispatch::error::{DomainError, DomainResult, ErrorKind};
use crate::dispatch::operation::{Method, OperationKind};
use crate::dispatch::outcome::PipelineOutcome;
use crate::dispatch::request::ParsedRequest;
use crate::inspect::{Authorize, Normalize, Prevalidator, Validate};

pub const PAGE_COUNT_HEADER: &str = "Page-Count";
pub const ITEM_COUNT_HEADER: &str = "Item-Count";

/// The optional stages of a pipeline. A stage that is `None` is skipped.
#[derive(Clone, Default)]
pub struct PipelineConfig {
    pub authorize: Option<Arc<dyn Authorize>>,
    pub prevalidator: Option<Prevalidator>,
    pub validate: Option<Arc<dyn Validate>>,
    pub normalize: Option<Arc<dyn Normalize>>,
    /// Deadline for each controller call
    pub invoke_timeout: Option<Duration>,
}

/// Runs requests for one resource against its controller.
#[derive(Clone)]
pub struct Pipeline {
    controller: Arc<dyn Controller>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(controller: impl Controller + 'static) -> Self {
        Self::with_config(Arc::new(controller), PipelineConfig::default())
    }

    pub fn with_config(controller: Arc<dyn Controller>, config: PipelineConfig) -> Self {
        Self { controller, config }
    }

    pub fn authorize(mut self, authorize: impl Authorize + 'static) -> Self {
        self.config.authorize = Some(Arc::new(authorize));
        self
    }

    pub fn prevalidate(mut self, prevalidator: Prevalidator) -> Self {
        self.config.prevalidator = Some(prevalidator);
        self
    }

    pub fn validate(mut self, validate: impl Validate + 'static) -> Self {
        self.config.validate = Some(Arc::new(validate));
        self
    }

    pub fn normalize(mut self, normalize: impl Normalize + 'static) -> Self {
        self.config.normalize = Some(Arc::new(normalize));
        self
    }

    pub fn invoke_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.invoke_timeout = timeout;
        self
    }

    /// Runs one request through the stages of its operation kind.
    pub async fn run(&self, kind: OperationKind, request: &ParsedRequest) -> PipelineOutcome {
        if kind == OperationKind::Unsupported {
            return PipelineOutcome::method_not_allowed();
        }

        let user_id = match self.authorizing(kind, request) {
            Ok(user_id) => user_id,
            Err(outcome) => return outcome,
        };

        let prevalidation = self.prevalidating(request);

        let result = match kind {
            OperationKind::Create => self.create(request, user_id, prevalidation).await,
            OperationKind::Read => self.read(request, user_id, prevalidation).await,
            OperationKind::Update => self.update(request, user_id, prevalidation).await,
            OperationKind::PartialUpdate => {
                self.partial_update(request, user_id, prevalidation).await
            }
            OperationKind::Delete => self.delete(request, user_id, prevalidation).await,
            OperationKind::List => self.list(request, user_id, prevalidation).await,
            OperationKind::Unsupported => Err(PipelineOutcome::method_not_allowed()),
        };

        result.unwrap_or_else(|outcome| outcome)
    }

    fn authorizing(
        &self,
        kind: OperationKind,
        request: &ParsedRequest,
    ) -> Result<Option<String>, PipelineOutcome> {
        let Some(authorize) = &self.config.authorize else {
            return Ok(None);
        };

        match authorize.authorize(request.header("authorization"), kind.access_level()) {
            Some(user_id) if !user_id.is_empty() => Ok(Some(user_id)),
            _ => {
                debug!(operation = ?kind, "authorization rejected");
                Err(PipelineOutcome::unauthorized())
            }
        }
    }

    fn prevalidating(&self, request: &ParsedRequest) -> Option<String> {
        self.config
            .prevalidator
            .as_ref()
            .and_then(|prevalidator| prevalidator.message(&request.identifiers))
    }

    /// Body validation. The prevalidation message, if any, goes last.
    fn validating(&self, model: &Model, prevalidation: Option<String>) -> Result<(), PipelineOutcome> {
        let mut messages = self
            .config
            .validate
            .as_ref()
            .map(|validate| validate.validate(model))
            .unwrap_or_default();
        messages.extend(prevalidation);

        if messages.is_empty() {
            Ok(())
        } else {
            debug!(count = messages.len(), "validation rejected");
            Err(PipelineOutcome::bad_request(messages))
        }
    }

    fn rejected_identifiers(prevalidation: Option<String>) -> Result<(), PipelineOutcome> {
        match prevalidation {
            Some(message) => {
                debug!(%message, "prevalidation rejected");
                Err(PipelineOutcome::bad_request(vec![message]))
            }
            None => Ok(()),
        }
    }

    async fn create(
        &self,
        request: &ParsedRequest,
        user_id: Option<String>,
        prevalidation: Option<String>,
    ) -> Result<PipelineOutcome, PipelineOutcome> {
        let model = request.model();
        self.validating(&model, prevalidation)?;

        let input = CreateInput {
            identifiers: request.identifiers.clone(),
            user_id,
            language: language(request),
            model,
        };
        let created = self.invoke(OperationKind::Create, self.controller.create(input)).await?;

        Ok(PipelineOutcome::created(Value::Object(created)))
    }

    async fn read(
        &self,
        request: &ParsedRequest,
        user_id: Option<String>,
        prevalidation: Option<String>,
    ) -> Result<PipelineOutcome, PipelineOutcome> {
        Self::rejected_identifiers(prevalidation)?;

        let input = ReadInput {
            identifiers: request.identifiers.clone(),
            user_id,
            language: language(request),
        };
        let model = self.invoke(OperationKind::Read, self.controller.read(input)).await?;

        Ok(PipelineOutcome::ok(Value::Object(model)))
    }

    async fn update(
        &self,
        request: &ParsedRequest,
        user_id: Option<String>,
        prevalidation: Option<String>,
    ) -> Result<PipelineOutcome, PipelineOutcome> {
        let model = request.model();
        self.validating(&model, prevalidation)?;

        let input = UpdateInput {
            identifiers: request.identifiers.clone(),
            user_id,
            language: language(request),
            model,
        };
        let updated = self.invoke(OperationKind::Update, self.controller.update(input)).await?;

        Ok(PipelineOutcome::ok(Value::Object(updated)))
    }

    async fn partial_update(
        &self,
        request: &ParsedRequest,
        user_id: Option<String>,
        prevalidation: Option<String>,
    ) -> Result<PipelineOutcome, PipelineOutcome> {
        Self::rejected_identifiers(prevalidation)?;

        let read = ReadInput {
            identifiers: request.identifiers.clone(),
            user_id: user_id.clone(),
            language: language(request),
        };
        let mut model = self
            .invoke(OperationKind::PartialUpdate, self.controller.read(read))
            .await?;

        merge(&mut model, request.model());
        self.validating(&model, None)?;

        let input = UpdateInput {
            identifiers: request.identifiers.clone(),
            user_id,
            language: language(request),
            model,
        };
        let updated = self
            .invoke(OperationKind::PartialUpdate, self.controller.update(input))
            .await?;

        Ok(PipelineOutcome::ok(Value::Object(updated)))
    }

    async fn delete(
        &self,
        request: &ParsedRequest,
        user_id: Option<String>,
        prevalidation: Option<String>,
    ) -> Result<PipelineOutcome, PipelineOutcome> {
        Self::rejected_identifiers(prevalidation)?;

        let input = DeleteInput {
            identifiers: request.identifiers.clone(),
            user_id,
        };
        self.invoke(OperationKind::Delete, self.controller.delete(input)).await?;

        Ok(PipelineOutcome::no_content())
    }

    async fn list(
        &self,
        request: &ParsedRequest,
        user_id: Option<String>,
        prevalidation: Option<String>,
    ) -> Result<PipelineOutcome, PipelineOutcome> {
        Self::rejected_identifiers(prevalidation)?;

        let mut filter = request.filter.clone();
        if let Some(normalize) = &self.config.normalize {
            normalize.normalize(&mut filter);
        }

        let input = ListInput {
            identifiers: request.identifiers.clone(),
            filter,
            sort_by: request.sort_by(),
            page_index: request.int_header("page-index"),
            page_size: request.int_header("page-size"),
            user_id,
            language: language(request),
        };
        let page = self.invoke(OperationKind::List, self.controller.list(input)).await?;

        let items = page.items.into_iter().map(Value::Object).collect();
        Ok(PipelineOutcome::ok(Value::Array(items))
            .with_header(PAGE_COUNT_HEADER, page.page_count.to_string())
            .with_header(ITEM_COUNT_HEADER, page.item_count.to_string()))
    }

    /// Awaits a controller call, bounded by the configured deadline, and maps
    /// its failure onto an outcome.
    async fn invoke<T>(
        &self,
        kind: OperationKind,
        call: impl Future<Output = DomainResult<T>>,
    ) -> Result<T, PipelineOutcome> {
        let result = match self.config.invoke_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(operation = ?kind, timeout_ms = limit.as_millis() as u64, "controller call timed out");
                    return Err(PipelineOutcome::internal("operation timed out"));
                }
            },
            None => call.await,
        };

        result.map_err(|e| {
            log_domain_error(kind, &e);
            PipelineOutcome::from_domain_error(&e)
        })
    }
}

#[async_trait]
impl Respond for Pipeline {
    async fn respond(
        &self,
        _method: Option<Method>,
        kind: OperationKind,
        request: &ParsedRequest,
    ) -> PipelineOutcome {
        self.run(kind, request).await
    }
}

/// Copies every field present in `partial` over `current`. Fields absent
/// from `partial` are left alone; an explicit null overwrites.
pub fn merge(current: &mut Model, partial: Model) {
    for (key, value) in partial {
        current.insert(key, value);
    }
}

fn language(request: &ParsedRequest) -> Option<String> {
    request.header("accept-language").map(String::from)
}

fn log_domain_error(kind: OperationKind, e: &DomainError) {
    match e.kind() {
        ErrorKind::Internal => error!(operation = ?kind, error = %e, "controller failed"),
        other => warn!(operation = ?kind, error = %e, kind = ?other, "controller rejected request"),
    }
}
