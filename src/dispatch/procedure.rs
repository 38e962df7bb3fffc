//! Procedure endpoints: a POST-only route that runs one resolver call.
//!
//! The route's shape does not matter here; any POST that matches it runs
//! the resolver, including one on a route ending in a placeholder.
//!
//! The lifecycle is a reduced resource pipeline: authorize with the
//! `Generic` access level, validate the body, execute, and answer 200.
//! A resolver rejection is answered with 403.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::dispatch::Respond;
use crate::dispatch::codec::Model;
use crate::dispatch::error::ExecuteError;
use crate::dispatch::operation::{AccessLevel, Method, OperationKind};
use crate::dispatch::outcome::PipelineOutcome;
use crate::dispatch::request::ParsedRequest;
use crate::inspect::{Authorize, Validate};

#[derive(Debug, Clone)]
pub struct ExecuteInput {
    pub user_id: Option<String>,
    pub data: Model,
}

/// Runs a named procedure.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn execute(&self, input: ExecuteInput) -> Result<Value, ExecuteError>;
}

#[derive(Clone)]
pub struct ProcedurePipeline {
    resolver: Arc<dyn Resolver>,
    authorize: Option<Arc<dyn Authorize>>,
    validate: Option<Arc<dyn Validate>>,
}

impl ProcedurePipeline {
    pub fn new(resolver: impl Resolver + 'static) -> Self {
        Self::shared(Arc::new(resolver))
    }

    pub fn shared(resolver: Arc<dyn Resolver>) -> Self {
        Self {
            resolver,
            authorize: None,
            validate: None,
        }
    }

    pub fn authorize(mut self, authorize: impl Authorize + 'static) -> Self {
        self.authorize = Some(Arc::new(authorize));
        self
    }

    pub fn validate(mut self, validate: impl Validate + 'static) -> Self {
        self.validate = Some(Arc::new(validate));
        self
    }

    /// Only POST executes; every other method is 405.
    pub async fn run(&self, method: Option<Method>, request: &ParsedRequest) -> PipelineOutcome {
        if method != Some(Method::Post) {
            return PipelineOutcome::method_not_allowed();
        }

        let mut user_id = None;
        if let Some(authorize) = &self.authorize {
            match authorize.authorize(request.header("authorization"), AccessLevel::Generic) {
                Some(id) if !id.is_empty() => user_id = Some(id),
                _ => {
                    debug!("authorization rejected");
                    return PipelineOutcome::unauthorized();
                }
            }
        }

        let data = request.model();
        if let Some(validate) = &self.validate {
            let messages = validate.validate(&data);
            if !messages.is_empty() {
                debug!(count = messages.len(), "validation rejected");
                return PipelineOutcome::bad_request(messages);
            }
        }

        match self.resolver.execute(ExecuteInput { user_id, data }).await {
            Ok(result) => PipelineOutcome::ok(result),
            Err(e) => {
                match &e {
                    ExecuteError::Rejected { .. } => warn!(error = %e, "resolver rejected request"),
                    ExecuteError::Internal(_) => error!(error = %e, "resolver failed"),
                }
                PipelineOutcome::from_execute_error(&e)
            }
        }
    }
}

#[async_trait]
impl Respond for ProcedurePipeline {
    async fn respond(
        &self,
        method: Option<Method>,
        _kind: OperationKind,
        request: &ParsedRequest,
    ) -> PipelineOutcome {
        self.run(method, request).await
    }
}
