//! Literal-or-pattern criteria.
//!
//! A criterion is compared against a single request attribute (path, a query
//! parameter or a header value). On the wire a plain JSON string is a literal and
//! an object of the form `{"regex": "<expr>"}` is a pattern.

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Criterion as it arrives in a stub definition.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum CriterionDef {
    /// Exact string equality
    Literal(String),
    /// Regular expression, unanchored unless the expression anchors itself
    Pattern { regex: String },
}

impl CriterionDef {
    pub fn literal(value: impl Into<String>) -> Self {
        CriterionDef::Literal(value.into())
    }

    pub fn pattern(regex: impl Into<String>) -> Self {
        CriterionDef::Pattern {
            regex: regex.into(),
        }
    }

    /// The literal value or the pattern expression.
    pub fn payload(&self) -> &str {
        match self {
            CriterionDef::Literal(value) => value,
            CriterionDef::Pattern { regex } => regex,
        }
    }

    /// Rebuild the criterion around a new payload, keeping its kind.
    pub fn with_payload(&self, payload: String) -> Self {
        match self {
            CriterionDef::Literal(_) => CriterionDef::Literal(payload),
            CriterionDef::Pattern { .. } => CriterionDef::Pattern { regex: payload },
        }
    }
}

/// Compiled criterion used at match time.
#[derive(Debug, Clone)]
pub enum Criterion {
    Literal(String),
    Pattern(Arc<Regex>),
}

impl Criterion {
    /// Compile a definition. Patterns are compiled once here so that matching
    /// never has to deal with a malformed expression.
    pub fn compile(def: &CriterionDef) -> Result<Self, regex::Error> {
        match def {
            CriterionDef::Literal(value) => Ok(Criterion::Literal(value.clone())),
            CriterionDef::Pattern { regex } => Ok(Criterion::Pattern(Arc::new(Regex::new(regex)?))),
        }
    }

    /// Check a request attribute against this criterion.
    ///
    /// An absent value never matches, whichever the kind.
    pub fn matches(&self, value: Option<&str>) -> bool {
        match (self, value) {
            (_, None) => false,
            (Criterion::Literal(expected), Some(actual)) => expected == actual,
            (Criterion::Pattern(regex), Some(actual)) => regex.is_match(actual),
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, Criterion::Pattern(_))
    }
}

impl PartialEq for Criterion {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Criterion::Literal(a), Criterion::Literal(b)) => a == b,
            (Criterion::Pattern(a), Criterion::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl Serialize for Criterion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Criterion::Literal(value) => serializer.serialize_str(value),
            Criterion::Pattern(regex) => CriterionDef::Pattern {
                regex: regex.as_str().to_string(),
            }
            .serialize(serializer),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::Literal(value) => write!(f, "{value}"),
            Criterion::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_literal_and_pattern() {
        let literal: CriterionDef = serde_json::from_str(r#""/users""#).unwrap();
        assert_eq!(literal, CriterionDef::literal("/users"));

        let pattern: CriterionDef = serde_json::from_str(r#"{"regex": "^/users/\\d+$"}"#).unwrap();
        assert_eq!(pattern, CriterionDef::pattern(r"^/users/\d+$"));
    }

    #[test]
    fn test_literal_matches_exactly() {
        let criterion = Criterion::compile(&CriterionDef::literal("/users")).unwrap();
        assert!(criterion.matches(Some("/users")));
        assert!(!criterion.matches(Some("/users/1")));
        assert!(!criterion.matches(Some("/USERS")));
        assert!(!criterion.matches(None));
    }

    #[test]
    fn test_pattern_matches() {
        let criterion = Criterion::compile(&CriterionDef::pattern(r"^/users/\d+$")).unwrap();
        assert!(criterion.is_pattern());
        assert!(criterion.matches(Some("/users/42")));
        assert!(!criterion.matches(Some("/users/abc")));
    }

    #[test]
    fn test_pattern_never_matches_absent_value() {
        let criterion = Criterion::compile(&CriterionDef::pattern(".*")).unwrap();
        assert!(criterion.matches(Some("")));
        assert!(!criterion.matches(None));
    }

    #[test]
    fn test_invalid_pattern_fails_to_compile() {
        assert!(Criterion::compile(&CriterionDef::pattern("(unclosed")).is_err());
    }

    #[test]
    fn test_serialize_round_trips_wire_form() {
        let pattern = Criterion::compile(&CriterionDef::pattern("^/a")).unwrap();
        assert_eq!(
            serde_json::to_value(&pattern).unwrap(),
            serde_json::json!({"regex": "^/a"})
        );
        let literal = Criterion::compile(&CriterionDef::literal("/a")).unwrap();
        assert_eq!(serde_json::to_value(&literal).unwrap(), serde_json::json!("/a"));
    }

    #[test]
    fn test_with_payload_keeps_kind() {
        let def = CriterionDef::pattern("a%20b").with_payload("a b".to_string());
        assert_eq!(def, CriterionDef::pattern("a b"));
        assert_eq!(def.payload(), "a b");
    }
}
