//! Best-effort coercion of list filters.
//!
//! Query values arrive as strings (or arrays of strings for repeated keys).
//! A `Normalizer` converts selected keys to the types the controller expects.
//! It never fails: a value that cannot be converted is removed from the
//! filter, and array conversions drop the items that cannot be converted.

use serde_json::{Number, Value};

use crate::dispatch::codec::Filter;
use crate::inspect::patterns;

type Rule = Box<dyn Fn(&mut Filter) + Send + Sync>;

#[derive(Default)]
pub struct Normalizer {
    rules: Vec<Rule>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies every rule to `filter`, in the order they were added.
    pub fn normalize(&self, filter: &mut Filter) {
        for rule in &self.rules {
            rule(filter);
        }
    }

    pub fn as_string(self, key: &str) -> Self {
        self.scalar(key, |value| value.is_string().then_some(value))
    }

    pub fn as_uuid(self, key: &str) -> Self {
        self.scalar(key, |value| matching(value, patterns::is_uuid))
    }

    pub fn as_date(self, key: &str) -> Self {
        self.scalar(key, |value| matching(value, patterns::is_date))
    }

    pub fn as_enum(self, key: &str, members: &[&str]) -> Self {
        let members = owned(members);
        self.scalar(key, move |value| {
            matching(value, |text| members.iter().any(|m| m == text))
        })
    }

    /// Parses the leading integer of the value: `"12"` and `"12px"` both
    /// become `12`.
    pub fn as_int(self, key: &str) -> Self {
        self.scalar(key, to_int)
    }

    pub fn as_float(self, key: &str) -> Self {
        self.scalar(key, to_float)
    }

    /// Only the exact strings `"true"` and `"false"` convert.
    pub fn as_boolean(self, key: &str) -> Self {
        self.scalar(key, |value| match value.as_str() {
            Some("true") => Some(Value::Bool(true)),
            Some("false") => Some(Value::Bool(false)),
            _ => None,
        })
    }

    /// Wraps a scalar value into a one-element array.
    pub fn as_string_array(self, key: &str) -> Self {
        self.array(key, Some)
    }

    pub fn as_uuid_array(self, key: &str) -> Self {
        self.array(key, |item| matching(item, patterns::is_uuid))
    }

    pub fn as_date_array(self, key: &str) -> Self {
        self.array(key, |item| matching(item, patterns::is_date))
    }

    pub fn as_enum_array(self, key: &str, members: &[&str]) -> Self {
        let members = owned(members);
        self.array(key, move |item| {
            matching(item, |text| members.iter().any(|m| m == text))
        })
    }

    pub fn as_int_array(self, key: &str) -> Self {
        self.array(key, to_int)
    }

    pub fn as_float_array(self, key: &str) -> Self {
        self.array(key, to_float)
    }

    /// Replaces the value under `key` with `convert(value)`, or removes it
    /// when the conversion yields nothing.
    fn scalar<F>(mut self, key: &str, convert: F) -> Self
    where
        F: Fn(Value) -> Option<Value> + Send + Sync + 'static,
    {
        let key = key.to_string();
        self.rules.push(Box::new(move |filter: &mut Filter| {
            if let Some(converted) = filter.remove(&key).and_then(&convert) {
                filter.insert(key.clone(), converted);
            }
        }));
        self
    }

    /// Turns the value under `key` into an array and keeps the items that
    /// `convert` accepts.
    fn array<F>(mut self, key: &str, convert: F) -> Self
    where
        F: Fn(Value) -> Option<Value> + Send + Sync + 'static,
    {
        let key = key.to_string();
        self.rules.push(Box::new(move |filter: &mut Filter| {
            let Some(value) = filter.remove(&key) else {
                return;
            };

            let items = match value {
                Value::Array(items) => items,
                Value::Null => return,
                other => vec![other],
            };

            let items = items.into_iter().filter_map(&convert).collect();
            filter.insert(key.clone(), Value::Array(items));
        }));
        self
    }
}

fn owned(members: &[&str]) -> Vec<String> {
    members.iter().map(|m| m.to_string()).collect()
}

fn matching(value: Value, accept: impl Fn(&str) -> bool) -> Option<Value> {
    if value.as_str().is_some_and(accept) {
        Some(value)
    } else {
        None
    }
}

fn to_int(value: Value) -> Option<Value> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(Value::Number(n)),
        Value::String(text) => patterns::leading_int(&text).map(Value::from),
        _ => None,
    }
}

fn to_float(value: Value) -> Option<Value> {
    match value {
        Value::Number(n) => Some(Value::Number(n)),
        Value::String(text) => patterns::leading_float(&text)
            .and_then(Number::from_f64)
            .map(Value::Number),
        _ => None,
    }
}
