use std::collections::HashMap;

use crate::dispatch::codec::{self, Filter, Model};
use crate::http::request::Request;
use crate::inspect::patterns;
use crate::routing::Identifiers;

/// The structured view of one inbound request, built once after routing.
#[derive(Debug, Clone, Default)]
pub struct ParsedRequest {
    /// Placeholder values from the matched route
    pub identifiers: Identifiers,
    /// Decoded query string
    pub filter: Filter,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl ParsedRequest {
    /// Builds the parsed view of `request` for an already matched route.
    pub fn from_request(identifiers: Identifiers, request: &Request) -> Self {
        Self::from_parts(
            identifiers,
            request.query(),
            request.headers.iter(),
            request.body.clone(),
        )
    }

    pub fn from_parts<K, V>(
        identifiers: Identifiers,
        query: Option<&str>,
        headers: impl IntoIterator<Item = (K, V)>,
        body: impl Into<Vec<u8>>,
    ) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            identifiers,
            filter: codec::parse_filter(query),
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.into()))
                .collect(),
            body: body.into(),
        }
    }

    /// Looks up a header ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_str())
    }

    /// Looks up a header and parses its leading integer, so `10abc` reads
    /// as 10. `None` when absent or when no digits lead.
    pub fn int_header(&self, name: &str) -> Option<i64> {
        self.header(name).and_then(patterns::leading_int)
    }

    /// Comma-separated sort keys from the `sort-by` header.
    pub fn sort_by(&self) -> Vec<String> {
        self.header("sort-by")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|key| !key.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The body decoded as a model; malformed input yields an empty model.
    pub fn model(&self) -> Model {
        codec::parse_body(&self.body)
    }
}
