use crate::inspect::patterns;
use crate::routing::Identifiers;

/// The single format every path identifier of a route must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrevalidationFormat {
    /// RFC 4122 UUID
    Uuid,
    /// Digits only
    Ncode,
}

/// Checks path identifiers before anything reaches the controller.
#[derive(Debug, Clone, Copy)]
pub struct Prevalidator {
    format: PrevalidationFormat,
}

impl Prevalidator {
    pub fn new(format: PrevalidationFormat) -> Self {
        Self { format }
    }

    /// Names of the identifiers that do not have the configured format, in
    /// route order.
    pub fn validate(&self, identifiers: &Identifiers) -> Vec<String> {
        identifiers
            .iter()
            .filter(|(_, value)| !self.accepts(value))
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// The bad-request message for the failing identifiers, if any.
    pub fn message(&self, identifiers: &Identifiers) -> Option<String> {
        let failing = self.validate(identifiers);
        if failing.is_empty() {
            None
        } else {
            Some(format!("invalid url for {}", failing.join(",")))
        }
    }

    fn accepts(&self, value: &str) -> bool {
        match self.format {
            PrevalidationFormat::Uuid => patterns::is_uuid(value),
            PrevalidationFormat::Ncode => patterns::is_ncode(value),
        }
    }
}
