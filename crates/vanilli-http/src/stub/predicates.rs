//! Predicate matching logic for stub selection.
//!
//! A stub is a candidate for a request when every predicate below holds:
//! method, url, query, headers, body and the remaining usage budget.

use super::criterion::Criterion;
use super::types::{media_type, Criteria, RequestView, Stub};
use std::collections::HashMap;

/// Check whether a stub is a candidate for the request.
pub fn stub_matches(stub: &Stub, request: &RequestView) -> bool {
    criteria_match(&stub.criteria, request) && has_remaining_uses(stub)
}

/// Check the request against a stub's criteria, ignoring its usage budget.
pub fn criteria_match(criteria: &Criteria, request: &RequestView) -> bool {
    method_matches(criteria.method.as_deref(), &request.method)
        && url_matches(&criteria.url, &request.path)
        && fields_match(&criteria.query, |name| {
            request.query.get(name).map(String::as_str)
        })
        && fields_match(&criteria.headers, |name| request.header(name))
        && body_matches(criteria, request)
}

/// Method criterion, compared case-insensitively
pub fn method_matches(expected: Option<&str>, actual: &str) -> bool {
    expected.map_or(true, |method| method.eq_ignore_ascii_case(actual))
}

/// Url criterion against the request path, with a leading slash enforced on the path
pub fn url_matches(criterion: &Criterion, path: &str) -> bool {
    if path.starts_with('/') {
        criterion.matches(Some(path))
    } else {
        criterion.matches(Some(&format!("/{path}")))
    }
}

/// Every named criterion must accept the value the lookup finds for that name.
pub fn fields_match<'a, F>(criteria: &HashMap<String, Criterion>, lookup: F) -> bool
where
    F: Fn(&str) -> Option<&'a str>,
{
    criteria
        .iter()
        .all(|(name, criterion)| criterion.matches(lookup(name)))
}

/// Body criterion: exact textual equality plus a matching content type.
///
/// A string criterion is compared with the raw body text. A structured criterion is
/// compared with the body parsed as JSON, which makes formatting differences such as
/// whitespace or key order irrelevant.
pub fn body_matches(criteria: &Criteria, request: &RequestView) -> bool {
    let Some(ref expected) = criteria.body else {
        return true;
    };
    let Some(ref actual) = request.body else {
        return false;
    };

    let content_type_matches = match (&criteria.content_type, &request.content_type) {
        (Some(expected), Some(actual)) => media_type(expected) == media_type(actual),
        _ => false,
    };
    if !content_type_matches {
        return false;
    }

    match expected {
        serde_json::Value::String(text) => text == actual,
        structured => serde_json::from_str::<serde_json::Value>(actual)
            .map(|parsed| &parsed == structured)
            .unwrap_or(false),
    }
}

/// Usage budget: exhausted non-expectation stubs are no longer candidates
pub fn has_remaining_uses(stub: &Stub) -> bool {
    !stub.is_exhausted()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::criterion::CriterionDef;
    use crate::stub::types::StubResponse;
    use serde_json::json;

    fn literal(value: &str) -> Criterion {
        Criterion::compile(&CriterionDef::literal(value)).unwrap()
    }

    fn pattern(regex: &str) -> Criterion {
        Criterion::compile(&CriterionDef::pattern(regex)).unwrap()
    }

    fn criteria(url: Criterion) -> Criteria {
        Criteria {
            url,
            method: None,
            headers: HashMap::new(),
            query: HashMap::new(),
            body: None,
            content_type: None,
        }
    }

    fn stub(criteria: Criteria) -> Stub {
        Stub {
            id: "s".to_string(),
            criteria,
            response: StubResponse {
                status: 200,
                body: None,
                content_type: None,
                headers: HashMap::new(),
                wait: None,
            },
            priority: 0,
            times: None,
            matched: 0,
            is_expectation: false,
            capture_id: None,
        }
    }

    #[test]
    fn test_method_is_case_insensitive() {
        assert!(method_matches(Some("get"), "GET"));
        assert!(method_matches(None, "DELETE"));
        assert!(!method_matches(Some("POST"), "GET"));
    }

    #[test]
    fn test_url_literal_and_pattern() {
        assert!(url_matches(&literal("/my/url"), "/my/url"));
        assert!(url_matches(&literal("/my/url"), "my/url"));
        assert!(!url_matches(&literal("/my/url"), "/my/url/"));
        assert!(url_matches(&pattern(r"^/users/\d+$"), "/users/7"));
        assert!(!url_matches(&pattern(r"^/users/\d+$"), "/users/x"));
    }

    #[test]
    fn test_query_criteria() {
        let mut c = criteria(literal("/search"));
        c.query.insert("q".to_string(), literal("rust"));
        c.query.insert("page".to_string(), pattern(r"^\d+$"));

        let ok = RequestView::new("GET", "/search")
            .with_query("q", "rust")
            .with_query("page", "2");
        assert!(criteria_match(&c, &ok));

        let wrong_literal = RequestView::new("GET", "/search")
            .with_query("q", "go")
            .with_query("page", "2");
        assert!(!criteria_match(&c, &wrong_literal));

        let missing_pattern_value = RequestView::new("GET", "/search").with_query("q", "rust");
        assert!(!criteria_match(&c, &missing_pattern_value));
    }

    #[test]
    fn test_header_names_are_case_insensitive() {
        let mut c = criteria(literal("/"));
        c.headers.insert("x-api-key".to_string(), literal("secret"));

        let request = RequestView::new("GET", "/").with_header("X-Api-Key", "secret");
        assert!(criteria_match(&c, &request));

        let wrong = RequestView::new("GET", "/").with_header("X-Api-Key", "Secret");
        assert!(!criteria_match(&c, &wrong));
    }

    #[test]
    fn test_body_text_match_requires_content_type() {
        let mut c = criteria(literal("/echo"));
        c.body = Some(json!("hello"));
        c.content_type = Some("text/plain".to_string());

        let request = RequestView::new("POST", "/echo").with_body("text/plain; charset=utf-8", "hello");
        assert!(body_matches(&c, &request));

        let other_type = RequestView::new("POST", "/echo").with_body("application/json", "hello");
        assert!(!body_matches(&c, &other_type));

        let no_body = RequestView::new("POST", "/echo");
        assert!(!body_matches(&c, &no_body));
    }

    #[test]
    fn test_body_structured_match() {
        let mut c = criteria(literal("/users"));
        c.body = Some(json!({"name": "ada", "age": 36}));
        c.content_type = Some("application/json".to_string());

        let reordered =
            RequestView::new("POST", "/users").with_body("application/json", r#"{"age":36, "name":"ada"}"#);
        assert!(body_matches(&c, &reordered));

        let different =
            RequestView::new("POST", "/users").with_body("application/json", r#"{"name":"bob"}"#);
        assert!(!body_matches(&c, &different));

        let not_json = RequestView::new("POST", "/users").with_body("application/json", "nope");
        assert!(!body_matches(&c, &not_json));
    }

    #[test]
    fn test_body_criterion_absent_ignores_body() {
        let c = criteria(literal("/"));
        let request = RequestView::new("POST", "/").with_body("text/plain", "anything");
        assert!(body_matches(&c, &request));
    }

    #[test]
    fn test_usage_budget() {
        let mut s = stub(criteria(literal("/")));
        s.times = Some(1);
        assert!(has_remaining_uses(&s));
        s.matched = 1;
        assert!(!has_remaining_uses(&s));
        assert!(!stub_matches(&s, &RequestView::new("GET", "/")));

        s.is_expectation = true;
        assert!(has_remaining_uses(&s));
        assert!(stub_matches(&s, &RequestView::new("GET", "/")));
    }
}
