//! System handlers.

use crate::admin_api::types::json_response;
use crate::stub::StubRegistry;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use std::sync::Arc;

/// GET /_vanilli/health - Health check
pub fn handle_health(registry: Arc<StubRegistry>) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &serde_json::json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "stubs": registry.len()
        }),
    )
}
