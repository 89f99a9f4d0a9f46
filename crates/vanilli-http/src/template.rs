//! Response body placeholder substitution.
//!
//! Response bodies may embed `@vanilli:<name>@` tokens which are replaced with the
//! value of the `<name>` query parameter of the request being answered.
//!
//! # Example
//!
//! ```
//! use vanilli_http::stub::RequestView;
//! use vanilli_http::template::substitute;
//!
//! let request = RequestView::new("GET", "/greet").with_query("name", "ada");
//! let body = serde_json::json!({"greeting": "hello @vanilli:name@"});
//! assert_eq!(
//!     substitute(&request, Some(&body)),
//!     Some(serde_json::json!({"greeting": "hello ada"}))
//! );
//! ```
//!
//! Structured bodies are rewritten string leaf by string leaf, so a substituted
//! value containing quotes or braces can never break the JSON structure. Object keys
//! are left untouched. Tokens naming an absent parameter are replaced with an
//! empty string.

use crate::stub::RequestView;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Regex for placeholder tokens: @vanilli:name@
static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX
        .get_or_init(|| Regex::new(r"@vanilli:([^@\s]+)@").expect("placeholder regex is valid"))
}

/// Substitute placeholders in a response body using the request's query parameters.
///
/// An absent body stays absent; bodies without placeholders come back unchanged.
pub fn substitute(
    request: &RequestView,
    body: Option<&serde_json::Value>,
) -> Option<serde_json::Value> {
    body.map(|value| substitute_value(&request.query, value))
}

/// Substitute placeholders in plain text.
pub fn substitute_text<'a>(query: &HashMap<String, String>, text: &'a str) -> Cow<'a, str> {
    if !text.contains("@vanilli:") {
        return Cow::Borrowed(text);
    }
    get_placeholder_regex().replace_all(text, |caps: &Captures| {
        query.get(&caps[1]).cloned().unwrap_or_default()
    })
}

fn substitute_value(
    query: &HashMap<String, String>,
    value: &serde_json::Value,
) -> serde_json::Value {
    match value {
        serde_json::Value::String(text) => {
            serde_json::Value::String(substitute_text(query, text).into_owned())
        }
        serde_json::Value::Array(items) => serde_json::Value::Array(
            items
                .iter()
                .map(|item| substitute_value(query, item))
                .collect(),
        ),
        serde_json::Value::Object(fields) => serde_json::Value::Object(
            fields
                .iter()
                .map(|(key, field)| (key.clone(), substitute_value(query, field)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request_with(query: &[(&str, &str)]) -> RequestView {
        query
            .iter()
            .fold(RequestView::new("GET", "/"), |request, (k, v)| {
                request.with_query(*k, *v)
            })
    }

    #[test]
    fn test_substitute_text_body() {
        let request = request_with(&[("p", "v")]);
        assert_eq!(
            substitute(&request, Some(&json!("pre@vanilli:p@post"))),
            Some(json!("prevpost"))
        );
    }

    #[test]
    fn test_substitute_structured_body() {
        let request = request_with(&[("p", "v")]);
        assert_eq!(
            substitute(&request, Some(&json!({"f": "@vanilli:p@"}))),
            Some(json!({"f": "v"}))
        );
    }

    #[test]
    fn test_absent_body_unchanged() {
        let request = RequestView::default();
        assert_eq!(substitute(&request, None), None);
    }

    #[test]
    fn test_empty_and_placeholder_free_bodies_unchanged() {
        let request = request_with(&[("p", "v")]);
        assert_eq!(substitute(&request, Some(&json!(""))), Some(json!("")));
        let body = json!({"a": [1, true, null, "plain"]});
        assert_eq!(substitute(&request, Some(&body)), Some(body.clone()));
        assert!(matches!(
            substitute_text(&request.query, "plain"),
            Cow::Borrowed("plain")
        ));
    }

    #[test]
    fn test_multiple_placeholders() {
        let request = request_with(&[("a", "1"), ("b", "2")]);
        assert_eq!(
            substitute_text(&request.query, "@vanilli:a@-@vanilli:b@-@vanilli:a@"),
            "1-2-1"
        );
    }

    #[test]
    fn test_missing_parameter_becomes_empty() {
        let request = RequestView::default();
        assert_eq!(substitute_text(&request.query, "x@vanilli:gone@y"), "xy");
    }

    #[test]
    fn test_nested_structures() {
        let request = request_with(&[("id", "42")]);
        let body = json!({
            "items": [{"id": "@vanilli:id@"}, "@vanilli:id@"],
            "count": 1
        });
        assert_eq!(
            substitute(&request, Some(&body)),
            Some(json!({"items": [{"id": "42"}, "42"], "count": 1}))
        );
    }

    #[test]
    fn test_substituted_value_cannot_break_structure() {
        let request = request_with(&[("evil", r#"","x":{"#)]);
        let body = json!({"f": "@vanilli:evil@"});
        assert_eq!(
            substitute(&request, Some(&body)),
            Some(json!({"f": r#"","x":{"#}))
        );
    }

    #[test]
    fn test_keys_are_not_substituted() {
        let request = request_with(&[("k", "v")]);
        let body = json!({"@vanilli:k@": "x"});
        assert_eq!(substitute(&request, Some(&body)), Some(body.clone()));
    }
}
