//! Request/response types and response helpers for the Admin API.

use crate::stub::{Stub, StubDefinition};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::Serialize;

/// Summary of a registered stub returned after registration
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StubSummary {
    pub id: String,
    pub priority: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_id: Option<String>,
    pub is_expectation: bool,
}

impl From<&Stub> for StubSummary {
    fn from(stub: &Stub) -> Self {
        Self {
            id: stub.id.clone(),
            priority: stub.priority,
            capture_id: stub.capture_id.clone(),
            is_expectation: stub.is_expectation,
        }
    }
}

/// Response for stub registration
#[derive(Debug, Serialize)]
pub struct AddStubsResponse {
    pub stubs: Vec<StubSummary>,
}

/// Response for expectation verification
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub errors: Vec<String>,
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorDetail>,
}

/// Individual error detail
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// Parse a registration payload: a single definition or an array of them.
pub fn parse_stub_definitions(body: &[u8]) -> Result<Vec<StubDefinition>, String> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| format!("Invalid stub JSON: {e}"))?;
    match value {
        serde_json::Value::Array(_) => {
            serde_json::from_value(value).map_err(|e| format!("Invalid stub JSON: {e}"))
        }
        serde_json::Value::Object(_) => serde_json::from_value(value)
            .map(|definition| vec![definition])
            .map_err(|e| format!("Invalid stub JSON: {e}")),
        _ => Err("Stub payload must be an object or an array of objects".to_string()),
    }
}

// =============================================================================
// Response helper functions
// =============================================================================

/// Create a JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = serde_json::to_string_pretty(body).unwrap_or_else(|_| "{}".to_string());
    build_response_with_headers(status, [("Content-Type", "application/json")], json)
}

/// Build an HTTP response with headers.
///
/// Falls back to a bare response if the builder rejects a header.
pub fn build_response_with_headers(
    status: StatusCode,
    headers: impl IntoIterator<Item = (impl AsRef<str>, impl AsRef<str>)>,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(status);
    for (key, value) in headers {
        builder = builder.header(key.as_ref(), value.as_ref());
    }
    builder
        .body(Full::new(body.into()))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Internal Server Error"))))
}

/// Create an error response
pub fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let error = ErrorResponse {
        errors: vec![ErrorDetail {
            code: status.as_str().to_string(),
            message: message.to_string(),
        }],
    };
    json_response(status, &error)
}

/// Create a not found response
pub fn not_found() -> Response<Full<Bytes>> {
    error_response(StatusCode::NOT_FOUND, "Not Found")
}

/// Collect request body into bytes
pub async fn collect_body(req: Request<Incoming>) -> Result<Bytes, String> {
    use http_body_util::BodyExt;
    req.collect()
        .await
        .map(|c| c.to_bytes())
        .map_err(|e| format!("Failed to read request body: {e}"))
}
