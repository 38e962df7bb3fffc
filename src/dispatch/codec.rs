//! Query string and body decoding.
//!
//! Both decoders are tolerant: a malformed body decodes to an empty model and
//! an absent query string decodes to an empty filter. Rejecting missing data
//! is left to validation.

use serde_json::{Map, Value};

/// A decoded JSON object, as exchanged with controllers.
pub type Model = Map<String, Value>;

/// Query parameters. Values are strings, or arrays of strings for repeated
/// keys, until a normalizer coerces them.
pub type Filter = Map<String, Value>;

/// Decodes a query string into a filter.
///
/// A key seen once stays a scalar; a repeated key collects its values into an
/// array in order of appearance. Keys and values are percent-decoded.
///
/// # Example
///
/// ```
/// # use restgate::dispatch::codec::parse_filter;
/// # use serde_json::json;
/// let filter = parse_filter(Some("a=x&a=y&b=z"));
/// assert_eq!(filter["a"], json!(["x", "y"]));
/// assert_eq!(filter["b"], json!("z"));
/// ```
pub fn parse_filter(query: Option<&str>) -> Filter {
    let mut filter = Filter::new();

    let Some(query) = query else {
        return filter;
    };

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let value = Value::String(value.into_owned());

        match filter.get_mut(key.as_ref()) {
            None => {
                filter.insert(key.into_owned(), value);
            }
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        }
    }

    filter
}

/// Decodes a request body into a model.
///
/// Anything that is not a JSON object (empty input, malformed JSON, a bare
/// array or scalar) decodes to an empty object.
pub fn parse_body(raw: &[u8]) -> Model {
    match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(model)) => model,
        _ => Model::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_query_is_empty() {
        assert!(parse_filter(None).is_empty());
        assert!(parse_filter(Some("")).is_empty());
    }

    #[test]
    fn body_fails_open() {
        assert!(parse_body(b"{not json").is_empty());
        assert!(parse_body(b"").is_empty());
    }
}
