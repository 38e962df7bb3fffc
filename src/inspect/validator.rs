//! Declarative model validation.
//!
//! A `Validator` is a list of checks. Each check looks at the model and
//! reports zero or more messages; running the validator runs every check and
//! returns the messages without duplicates, in first-seen order.
//!
//! Fields are addressed by key, with `.` descending into nested objects
//! (`"owner.name"`). Type checks skip fields that are absent or null; use
//! `not_empty` to require a value.
//!
//! # Example
//!
//! ```
//! # use restgate::inspect::Validator;
//! # use serde_json::json;
//! let validator = Validator::new()
//!     .not_empty("cat", "empty cat")
//!     .is_string("cat", "cat must be a string")
//!     .is_int("dog", "dog must be an integer");
//!
//! let model = json!({ "dog": 1.5 }).as_object().unwrap().clone();
//! assert_eq!(validator.validate(&model), vec!["empty cat", "dog must be an integer"]);
//! ```

use serde_json::Value;

use crate::dispatch::codec::Model;
use crate::inspect::patterns;

type Check = Box<dyn Fn(&Model) -> Vec<String> + Send + Sync>;

#[derive(Default)]
pub struct Validator {
    checks: Vec<Check>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom check.
    pub fn check<F>(mut self, check: F) -> Self
    where
        F: Fn(&Model) -> Vec<String> + Send + Sync + 'static,
    {
        self.checks.push(Box::new(check));
        self
    }

    /// Runs every check against `model`.
    pub fn validate(&self, model: &Model) -> Vec<String> {
        let mut messages: Vec<String> = Vec::new();

        for message in self.checks.iter().flat_map(|check| check(model)) {
            if !messages.contains(&message) {
                messages.push(message);
            }
        }

        messages
    }

    /// Fails when the field is present at all, even as null.
    pub fn not_allowed(self, field: &str, message: &str) -> Self {
        self.rule(field, message, |value| value.is_none())
    }

    /// Fails when the field is absent or null.
    pub fn not_empty(self, field: &str, message: &str) -> Self {
        self.rule(field, message, |value| {
            !matches!(value, None | Some(Value::Null))
        })
    }

    pub fn is_string(self, field: &str, message: &str) -> Self {
        self.typed(field, message, Value::is_string)
    }

    /// Fails when a string value is shorter than `min` or longer than `max`
    /// characters.
    pub fn must_length(self, field: &str, min: usize, max: usize, message: &str) -> Self {
        self.typed(field, message, move |value| match value.as_str() {
            Some(text) => (min..=max).contains(&text.chars().count()),
            None => true,
        })
    }

    pub fn is_uuid(self, field: &str, message: &str) -> Self {
        self.typed(field, message, |value| {
            value.as_str().is_some_and(patterns::is_uuid)
        })
    }

    pub fn is_date(self, field: &str, message: &str) -> Self {
        self.typed(field, message, |value| {
            value.as_str().is_some_and(patterns::is_date)
        })
    }

    pub fn is_email(self, field: &str, message: &str) -> Self {
        self.typed(field, message, |value| {
            value.as_str().is_some_and(patterns::is_email)
        })
    }

    pub fn is_enum(self, field: &str, members: &[&str], message: &str) -> Self {
        let members: Vec<String> = members.iter().map(|m| m.to_string()).collect();
        self.typed(field, message, move |value| {
            value
                .as_str()
                .is_some_and(|text| members.iter().any(|m| m == text))
        })
    }

    /// Passes for numbers without a fractional part, including `1.0`.
    pub fn is_int(self, field: &str, message: &str) -> Self {
        self.typed(field, message, |value| {
            value.as_f64().is_some_and(|n| n.fract() == 0.0)
        })
    }

    pub fn is_float(self, field: &str, message: &str) -> Self {
        self.typed(field, message, Value::is_number)
    }

    /// Fails when a numeric value lies outside `min..=max`.
    pub fn must_range(self, field: &str, min: f64, max: f64, message: &str) -> Self {
        self.typed(field, message, move |value| match value.as_f64() {
            Some(n) => n >= min && n <= max,
            None => true,
        })
    }

    pub fn is_boolean(self, field: &str, message: &str) -> Self {
        self.typed(field, message, Value::is_boolean)
    }

    pub fn is_array(self, field: &str, message: &str) -> Self {
        self.typed(field, message, Value::is_array)
    }

    /// A check on a non-null value; absent and null values pass.
    fn typed<F>(self, field: &str, message: &str, accept: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.rule(field, message, move |value| match value {
            None | Some(Value::Null) => true,
            Some(value) => accept(value),
        })
    }

    fn rule<F>(self, field: &str, message: &str, accept: F) -> Self
    where
        F: Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    {
        let field = field.to_string();
        let message = message.to_string();

        self.check(move |model| {
            if accept(lookup(model, &field)) {
                Vec::new()
            } else {
                vec![message.clone()]
            }
        })
    }
}

fn lookup<'a>(model: &'a Model, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut value = model.get(parts.next()?)?;

    for part in parts {
        value = value.as_object()?.get(part)?;
    }

    Some(value)
}
