use serde::Serialize;
use serde_json::Value;

use crate::dispatch::error::{DomainError, ErrorKind, ExecuteError};
use crate::http::response::{Response, ResponseBuilder, StatusCode};

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl Alert {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            details: None,
        }
    }

    pub fn with_code(mut self, code: Option<String>) -> Self {
        self.code = code;
        self
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = Some(details);
        self
    }
}

/// The single terminal result of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Success {
        status: StatusCode,
        body: Option<Value>,
        headers: Vec<(String, String)>,
    },
    ClientError {
        status: StatusCode,
        alert: Alert,
    },
    ServerError {
        status: StatusCode,
        alert: Alert,
    },
}

impl PipelineOutcome {
    pub fn ok(body: Value) -> Self {
        Self::success(StatusCode::Ok, body)
    }

    pub fn created(body: Value) -> Self {
        Self::success(StatusCode::Created, body)
    }

    pub fn no_content() -> Self {
        PipelineOutcome::Success {
            status: StatusCode::NoContent,
            body: None,
            headers: Vec::new(),
        }
    }

    fn success(status: StatusCode, body: Value) -> Self {
        PipelineOutcome::Success {
            status,
            body: Some(body),
            headers: Vec::new(),
        }
    }

    /// Adds a response header to a successful outcome. Error outcomes are
    /// returned unchanged.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let PipelineOutcome::Success { headers, .. } = &mut self {
            headers.push((name.into(), value.into()));
        }
        self
    }

    pub fn unauthorized() -> Self {
        Self::client(ErrorKind::Unauthorized, Alert::new("unauthorized"))
    }

    /// 400 carrying every validation message, in order.
    pub fn bad_request(messages: Vec<String>) -> Self {
        Self::client(
            ErrorKind::BadRequest,
            Alert::new("bad request").with_details(messages),
        )
    }

    pub fn method_not_allowed() -> Self {
        Self::client(ErrorKind::MethodNotAllowed, Alert::new("method not allowed"))
    }

    /// No registered route matched the request path.
    pub fn route_not_found() -> Self {
        Self::client(ErrorKind::NotFound, Alert::new("not found"))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PipelineOutcome::ServerError {
            status: ErrorKind::Internal.status(),
            alert: Alert::new(message),
        }
    }

    fn client(kind: ErrorKind, alert: Alert) -> Self {
        PipelineOutcome::ClientError {
            status: kind.status(),
            alert,
        }
    }

    /// Translates a controller error. The error kind alone decides the status.
    pub fn from_domain_error(error: &DomainError) -> Self {
        match error {
            DomainError::Forbidden { message, code } => Self::client(
                ErrorKind::Forbidden,
                Alert::new(message.as_str()).with_code(code.clone()),
            ),
            DomainError::NotFound(message) => {
                Self::client(ErrorKind::NotFound, Alert::new(message.as_str()))
            }
            DomainError::MethodNotAllowed(message) => {
                Self::client(ErrorKind::MethodNotAllowed, Alert::new(message.as_str()))
            }
            DomainError::Internal(error) => Self::internal(error.to_string()),
        }
    }

    /// Translates a resolver error: rejections become 403, the rest 500.
    pub fn from_execute_error(error: &ExecuteError) -> Self {
        match error {
            ExecuteError::Rejected { message, code } => Self::client(
                ErrorKind::Forbidden,
                Alert::new(message.as_str()).with_code(code.clone()),
            ),
            ExecuteError::Internal(error) => Self::internal(error.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            PipelineOutcome::Success { status, .. }
            | PipelineOutcome::ClientError { status, .. }
            | PipelineOutcome::ServerError { status, .. } => *status,
        }
    }

    /// The messages an error outcome reports: the validation details when
    /// present, otherwise the alert message. Empty for successes.
    pub fn messages(&self) -> Vec<&str> {
        match self {
            PipelineOutcome::Success { .. } => Vec::new(),
            PipelineOutcome::ClientError { alert, .. }
            | PipelineOutcome::ServerError { alert, .. } => match &alert.details {
                Some(details) => details.iter().map(String::as_str).collect(),
                None => vec![alert.message.as_str()],
            },
        }
    }

    /// Renders the outcome as the one response written for the request.
    pub fn into_response(self) -> Response {
        match self {
            PipelineOutcome::Success {
                status,
                body,
                headers,
            } => {
                let builder = headers
                    .into_iter()
                    .fold(ResponseBuilder::new(status), |builder, (name, value)| {
                        builder.header(name, value)
                    });

                match body {
                    Some(body) => builder.json(&body).build(),
                    None => builder.build(),
                }
            }
            PipelineOutcome::ClientError { status, alert }
            | PipelineOutcome::ServerError { status, alert } => {
                ResponseBuilder::new(status).json(&alert).build()
            }
        }
    }
}

impl From<PipelineOutcome> for Response {
    fn from(outcome: PipelineOutcome) -> Self {
        outcome.into_response()
    }
}
