//! Request dispatch: from a matched route to exactly one outcome.
//!
//! # Data Flow
//! ```text
//! Request (method token, path, headers, body)
//!     → operation.rs  (method + route shape → OperationKind)
//!     → request.rs    (identifiers, filter, headers, body → ParsedRequest)
//!     → pipeline.rs   (authorize → prevalidate → validate → invoke → map)
//!     → outcome.rs    (PipelineOutcome → Response)
//! ```
//!
//! Controllers are reached through the `Controller` trait and report
//! failures as `DomainError`; nothing a controller returns escapes the
//! pipeline unmapped.

pub mod codec;
pub mod controller;
pub mod error;
pub mod operation;
pub mod outcome;
pub mod pipeline;
pub mod procedure;
pub mod request;

pub use controller::{Controller, Page};
pub use error::{DomainError, ErrorKind, ExecuteError};
pub use operation::{AccessLevel, Method, OperationKind};
pub use outcome::{Alert, PipelineOutcome};
pub use pipeline::{Pipeline, PipelineConfig};
pub use procedure::{ProcedurePipeline, Resolver};
pub use request::ParsedRequest;

use async_trait::async_trait;

/// Something a route can hand its requests to.
///
/// `method` is the parsed request method (`None` for an unknown token) and
/// `kind` its classification against the matched route's shape.
#[async_trait]
pub trait Respond: Send + Sync {
    async fn respond(
        &self,
        method: Option<Method>,
        kind: OperationKind,
        request: &ParsedRequest,
    ) -> PipelineOutcome;
}
