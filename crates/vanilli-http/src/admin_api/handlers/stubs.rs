//! Stub management handlers.

use crate::admin_api::types::{
    collect_body, error_response, json_response, parse_stub_definitions, AddStubsResponse,
    StubSummary, VerifyResponse,
};
use crate::stub::{RegistryError, StubRegistry};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;
use tracing::info;

/// POST /_vanilli/stubs - Register one stub or an array of stubs
pub async fn handle_add(
    req: Request<Incoming>,
    registry: Arc<StubRegistry>,
) -> Response<Full<Bytes>> {
    let body = match collect_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e),
    };

    let definitions = match parse_stub_definitions(&body) {
        Ok(definitions) => definitions,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e),
    };

    match registry.add_stubs(definitions) {
        Ok(stubs) => {
            info!(count = stubs.len(), total = registry.len(), "Stubs added");
            let response = AddStubsResponse {
                stubs: stubs.iter().map(StubSummary::from).collect(),
            };
            json_response(StatusCode::OK, &response)
        }
        Err(e @ RegistryError::Validation(_)) => {
            error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
    }
}

/// DELETE /_vanilli/stubs - Remove every stub and capture
pub fn handle_clear(registry: Arc<StubRegistry>) -> Response<Full<Bytes>> {
    registry.clear();
    json_response(StatusCode::OK, &serde_json::json!({"stubs": []}))
}

/// GET /_vanilli/stubs/:id - Fetch a stub with its current match count
pub fn handle_get(id: &str, registry: Arc<StubRegistry>) -> Response<Full<Bytes>> {
    match registry.get_by_id(id) {
        Some(stub) => json_response(StatusCode::OK, &stub),
        None => error_response(StatusCode::NOT_FOUND, &format!("Stub {id} not found")),
    }
}

/// GET /_vanilli/verify - Report unmet expectations
pub fn handle_verify(registry: Arc<StubRegistry>) -> Response<Full<Bytes>> {
    let errors = registry.verify_expectations();
    json_response(StatusCode::OK, &VerifyResponse { errors })
}
