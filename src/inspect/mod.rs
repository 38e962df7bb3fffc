//! Request inspection: authorization, identifier prevalidation, body
//! validation and filter normalization.
//!
//! The pipeline consumes each stage through a small trait. The builders in
//! this module implement them, and so does any closure with the matching
//! signature:
//!
//! ```ignore
//! let pipeline = Pipeline::new(controller)
//!     .authorize(|token: Option<&str>, _level: AccessLevel| token.map(str::to_string))
//!     .validate(Validator::new().not_empty("name", "empty name"))
//!     .normalize(Normalizer::new().as_int("age"));
//! ```

pub mod normalizer;
pub mod patterns;
pub mod prevalidator;
pub mod validator;

pub use normalizer::Normalizer;
pub use prevalidator::{PrevalidationFormat, Prevalidator};
pub use validator::Validator;

use crate::dispatch::codec::{Filter, Model};
use crate::dispatch::operation::AccessLevel;

/// Resolves the `authorization` header to a user id.
///
/// Returning `None` rejects the request with 401.
pub trait Authorize: Send + Sync {
    fn authorize(&self, authorization: Option<&str>, level: AccessLevel) -> Option<String>;
}

impl<F> Authorize for F
where
    F: Fn(Option<&str>, AccessLevel) -> Option<String> + Send + Sync,
{
    fn authorize(&self, authorization: Option<&str>, level: AccessLevel) -> Option<String> {
        self(authorization, level)
    }
}

/// Reports every violation found in a model, in order, without duplicates.
pub trait Validate: Send + Sync {
    fn validate(&self, model: &Model) -> Vec<String>;
}

impl<F> Validate for F
where
    F: Fn(&Model) -> Vec<String> + Send + Sync,
{
    fn validate(&self, model: &Model) -> Vec<String> {
        self(model)
    }
}

impl Validate for Validator {
    fn validate(&self, model: &Model) -> Vec<String> {
        Validator::validate(self, model)
    }
}

/// Coerces filter values in place. Never fails.
pub trait Normalize: Send + Sync {
    fn normalize(&self, filter: &mut Filter);
}

impl<F> Normalize for F
where
    F: Fn(&mut Filter) + Send + Sync,
{
    fn normalize(&self, filter: &mut Filter) {
        self(filter)
    }
}

impl Normalize for Normalizer {
    fn normalize(&self, filter: &mut Filter) {
        Normalizer::normalize(self, filter)
    }
}
