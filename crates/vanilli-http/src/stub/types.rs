//! Type definitions for the stub registry.
//!
//! Definitions (`*Definition`) are what clients send; they are loosely typed so that
//! missing fields surface as validation errors with a useful message rather than as
//! JSON decoding failures. A definition that passes validation becomes a [`Stub`].

use super::criterion::{Criterion, CriterionDef};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Stub Definitions (wire format)
// ============================================================================

/// Stub definition as posted by a client or listed in the config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StubDefinition {
    #[serde(default)]
    pub criteria: Option<CriteriaDefinition>,
    #[serde(default)]
    pub response: Option<ResponseDefinition>,
    /// Lower value wins when several stubs match
    #[serde(default)]
    pub priority: i64,
    /// Maximum number of matches; unbounded when absent
    #[serde(default)]
    pub times: Option<u64>,
    /// Marks the stub as an expectation checked by verification
    #[serde(default, alias = "isExpectation")]
    pub expect: bool,
    #[serde(default)]
    pub capture_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaDefinition {
    #[serde(default)]
    pub url: Option<CriterionDef>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, CriterionDef>,
    #[serde(default)]
    pub query: HashMap<String, CriterionDef>,
    #[serde(default)]
    pub body: Option<serde_json::Value>,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDefinition {
    #[serde(default, deserialize_with = "deserialize_status_code")]
    pub status: Option<u16>,
    #[serde(default)]
    pub body: Option<serde_json::Value>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Response delay in milliseconds
    #[serde(default)]
    pub wait: Option<u64>,
}

/// Deserialize a status from either a number or a numeric string
fn deserialize_status_code<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u16::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| D::Error::custom("invalid status code number")),
        Some(serde_json::Value::String(s)) => s
            .parse::<u16>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid status code string: {s}"))),
        Some(_) => Err(D::Error::custom("status must be a number or string")),
    }
}

// ============================================================================
// Registered Stubs
// ============================================================================

/// A validated, registered stub.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stub {
    pub id: String,
    pub criteria: Criteria,
    pub response: StubResponse,
    pub priority: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub times: Option<u64>,
    /// Number of requests this stub has won
    pub matched: u64,
    pub is_expectation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_id: Option<String>,
}

impl Stub {
    /// Call count verification expects. An expectation without `times` is
    /// satisfied by exactly one call.
    pub fn expected_calls(&self) -> u64 {
        self.times.unwrap_or(1)
    }

    /// Whether the usage budget is spent. Expectations never run out.
    pub fn is_exhausted(&self) -> bool {
        !self.is_expectation && self.times.is_some_and(|times| self.matched >= times)
    }
}

/// Compiled criteria of a registered stub.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Criteria {
    pub url: Criterion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Keyed by lowercased header name
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, Criterion>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub query: HashMap<String, Criterion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Canned response of a registered stub.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StubResponse {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait: Option<u64>,
}

// ============================================================================
// Requests and Captures
// ============================================================================

/// Transport-free view of an incoming request.
#[derive(Debug, Clone, Default)]
pub struct RequestView {
    pub method: String,
    /// Percent-decoded path, without the query string
    pub path: String,
    pub query: HashMap<String, String>,
    /// Keyed by lowercased header name
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
    /// Media type declared for the body, without parameters
    pub content_type: Option<String>,
}

impl RequestView {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, content_type: &str, body: impl Into<String>) -> Self {
        self.content_type = Some(media_type(content_type));
        self.body = Some(body.into());
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Strip parameters from a content type and lowercase it:
/// `Application/JSON; charset=utf-8` becomes `application/json`.
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Snapshot of a request recorded for a capture-enabled stub.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSnapshot {
    /// Parsed JSON for JSON bodies, text otherwise, null when there was no body
    pub body: serde_json::Value,
    pub headers: HashMap<String, String>,
    pub query: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl CaptureSnapshot {
    pub fn from_request(request: &RequestView) -> Self {
        let is_json = request
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("json"));
        let body = match request.body.as_deref() {
            None => serde_json::Value::Null,
            Some(text) if is_json => serde_json::from_str(text)
                .unwrap_or_else(|_| serde_json::Value::String(text.to_string())),
            Some(text) => serde_json::Value::String(text.to_string()),
        };

        Self {
            body,
            headers: request.headers.clone(),
            query: request.query.clone(),
            content_type: request.content_type.clone(),
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Error types for the stub registry
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RegistryError {
    #[error("Invalid stub: {0}")]
    Validation(String),
}

impl RegistryError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        RegistryError::Validation(message.into())
    }
}
