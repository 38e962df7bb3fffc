/// HTTP methods the dispatch layer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Get,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Parses a raw method token. Surrounding whitespace and case are ignored.
    ///
    /// # Example
    ///
    /// ```
    /// # use restgate::dispatch::operation::Method;
    /// assert_eq!(Method::parse(" patch "), Some(Method::Patch));
    /// assert_eq!(Method::parse("HEAD"), None);
    /// ```
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "POST" => Some(Method::Post),
            "GET" => Some(Method::Get),
            "PUT" => Some(Method::Put),
            "PATCH" => Some(Method::Patch),
            "DELETE" => Some(Method::Delete),
            _ => None,
        }
    }
}

/// What a request asks the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Create,
    Read,
    Update,
    PartialUpdate,
    Delete,
    List,
    Unsupported,
}

impl OperationKind {
    /// Classifies a method token against the shape of the matched route.
    ///
    /// Collection routes accept POST (create) and GET (list); single-resource
    /// routes accept GET, PUT, PATCH and DELETE. Everything else, including
    /// unknown tokens, is `Unsupported`.
    pub fn classify(token: &str, is_collection: bool) -> Self {
        match (Method::parse(token), is_collection) {
            (Some(Method::Post), true) => OperationKind::Create,
            (Some(Method::Get), true) => OperationKind::List,
            (Some(Method::Get), false) => OperationKind::Read,
            (Some(Method::Put), false) => OperationKind::Update,
            (Some(Method::Patch), false) => OperationKind::PartialUpdate,
            (Some(Method::Delete), false) => OperationKind::Delete,
            _ => OperationKind::Unsupported,
        }
    }

    /// The access level handed to the authorization function.
    pub fn access_level(&self) -> AccessLevel {
        match self {
            OperationKind::Read | OperationKind::List => AccessLevel::Read,
            OperationKind::Create | OperationKind::Update | OperationKind::PartialUpdate => {
                AccessLevel::Write
            }
            OperationKind::Delete => AccessLevel::Delete,
            OperationKind::Unsupported => AccessLevel::Generic,
        }
    }
}

/// Access level requested from the authorization function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    Read,
    Write,
    Delete,
    Generic,
}
