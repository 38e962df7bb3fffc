//! Compiled route patterns.
//!
//! A route string such as `owner/{ownerId}/cat/{id}` is split on `/` and each
//! part becomes either a literal or a named placeholder. Compilation happens
//! once at registration; a pattern is immutable afterwards.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::routing::RouteError;

const SEPARATOR: char = '/';

static LITERAL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z-]*[a-z]$|^[a-z]$").unwrap());

static PLACEHOLDER_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-zA-Z]*$").unwrap());

/// One segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matched case-insensitively against the request segment.
    Literal(String),
    /// Binds the request segment under this name.
    Placeholder(String),
}

/// Placeholder values extracted by a successful match, in pattern order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identifiers(Vec<(String, String)>);

impl Identifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Identifiers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A validated route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    route: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Validates `route` and compiles it into segments.
    ///
    /// A route is accepted only when it has no leading or trailing `/`, every
    /// literal is lowercase with internal hyphens only, every placeholder is a
    /// single `{camelCase}` pair, and no two placeholders are adjacent.
    pub fn compile(route: &str) -> Result<Self, RouteError> {
        let invalid = |reason: String| RouteError::InvalidRoute {
            route: route.to_string(),
            reason,
        };

        if route.starts_with(SEPARATOR) || route.ends_with(SEPARATOR) {
            return Err(invalid("leading or trailing separator".to_string()));
        }

        let mut segments: Vec<Segment> = Vec::new();
        for part in route.split(SEPARATOR) {
            let segment = if let Some(inner) = part.strip_prefix('{') {
                let name = inner
                    .strip_suffix('}')
                    .ok_or_else(|| invalid(format!("unclosed placeholder `{}`", part)))?;

                if !PLACEHOLDER_NAME_REGEX.is_match(name) {
                    return Err(invalid(format!("placeholder `{}` is not camelCase", part)));
                }

                if matches!(segments.last(), Some(Segment::Placeholder(_))) {
                    return Err(invalid(format!("placeholder `{}` follows another placeholder", part)));
                }

                Segment::Placeholder(name.to_string())
            } else {
                if !LITERAL_REGEX.is_match(part) {
                    return Err(invalid(format!("literal `{}` is not lowercase kebab-case", part)));
                }

                Segment::Literal(part.to_string())
            };

            segments.push(segment);
        }

        Ok(Self {
            route: route.to_string(),
            segments,
        })
    }

    /// Matches a request path against this pattern.
    ///
    /// Any query string is ignored. Literals compare case-insensitively;
    /// placeholders bind the raw, undecoded path segment.
    pub fn matches(&self, path: &str) -> Option<Identifiers> {
        let path = path.split_once('?').map(|(p, _)| p).unwrap_or(path);
        let path = path.strip_prefix(SEPARATOR).unwrap_or(path);

        let parts: Vec<&str> = path.split(SEPARATOR).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut identifiers = Identifiers::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) => {
                    if !literal.eq_ignore_ascii_case(part) {
                        return None;
                    }
                }
                Segment::Placeholder(name) => identifiers.insert(name.as_str(), part),
            }
        }

        Some(identifiers)
    }

    /// A route ending in a literal addresses a collection; one ending in a
    /// placeholder addresses a single resource.
    pub fn is_collection(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Literal(_)))
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.route
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.route)
    }
}
