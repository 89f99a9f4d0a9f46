//! Request handling for requests answered by stubs.
//!
//! Turns a hyper request into a [`RequestView`], asks the registry for a match and
//! renders the winning stub's response.

use super::registry::StubRegistry;
use super::types::{media_type, RequestView, StubResponse};
use crate::admin_api::types::{build_response_with_headers, error_response};
use crate::template::substitute;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Handle a request that is not addressed to the admin API
pub async fn handle_stub_request(
    req: Request<Incoming>,
    registry: Arc<StubRegistry>,
) -> Response<Full<Bytes>> {
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!("Failed to read request body: {}", e);
            return error_response(StatusCode::BAD_REQUEST, "Failed to read request body");
        }
    };

    let view = request_view(parts.method.as_str(), &parts.uri, &parts.headers, &body);

    let Some(stub) = registry.find_match_for(&view) else {
        return no_match_response();
    };

    // The match is already recorded; the delay only holds back this response.
    if let Some(wait_ms) = stub.response.wait.filter(|ms| *ms > 0) {
        debug!(stub_id = %stub.id, wait_ms, "Delaying stub response");
        tokio::time::sleep(Duration::from_millis(wait_ms)).await;
    }

    build_stub_response(&stub.response, &view)
}

/// Build the normalized request view from request parts.
pub fn request_view(
    method: &str,
    uri: &hyper::Uri,
    headers: &hyper::HeaderMap,
    body: &[u8],
) -> RequestView {
    let path = urlencoding::decode(uri.path())
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| uri.path().to_string());

    let headers: HashMap<String, String> = headers
        .iter()
        .filter_map(|(k, v)| {
            v.to_str()
                .ok()
                .map(|value| (k.as_str().to_ascii_lowercase(), value.to_string()))
        })
        .collect();

    let body = if body.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(body).into_owned())
    };
    let content_type = body
        .as_ref()
        .and_then(|_| headers.get("content-type"))
        .map(|ct| media_type(ct));

    RequestView {
        method: method.to_string(),
        path,
        query: parse_query_string(uri.query()),
        headers,
        body,
        content_type,
    }
}

/// Parse a query string, URL-decoding keys and values. A repeated key keeps its
/// last value; a key without `=` maps to an empty string.
pub fn parse_query_string(query: Option<&str>) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let Some(query) = query else {
        return params;
    };
    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params.insert(decode_component(key), decode_component(value));
    }
    params
}

fn decode_component(component: &str) -> String {
    let spaced = component.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}

/// Render a stub response, substituting placeholders in its body.
pub fn build_stub_response(response: &StubResponse, request: &RequestView) -> Response<Full<Bytes>> {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let body = match substitute(request, response.body.as_ref()) {
        None => Bytes::new(),
        Some(serde_json::Value::String(text)) => Bytes::from(text),
        Some(structured) => Bytes::from(structured.to_string()),
    };

    // A declared contentType takes precedence over a Content-Type in the header map
    let mut headers: Vec<(&str, &str)> = response
        .headers
        .iter()
        .filter(|(k, _)| response.content_type.is_none() || !k.eq_ignore_ascii_case("content-type"))
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    if let Some(ref content_type) = response.content_type {
        headers.push(("Content-Type", content_type.as_str()));
    }

    build_response_with_headers(status, headers, body)
}

/// Fixed diagnostic response when no stub matches
pub fn no_match_response() -> Response<Full<Bytes>> {
    error_response(StatusCode::NOT_FOUND, "No stub matched the request")
}
