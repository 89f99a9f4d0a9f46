//! Capture retrieval handlers.

use crate::admin_api::types::{error_response, json_response};
use crate::stub::StubRegistry;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use std::sync::Arc;

/// GET /_vanilli/captures/:captureId - Most recent capture
pub fn handle_get_latest(capture_id: &str, registry: Arc<StubRegistry>) -> Response<Full<Bytes>> {
    match registry.get_capture(capture_id) {
        Some(capture) => json_response(StatusCode::OK, &capture),
        None => capture_not_found(capture_id),
    }
}

/// GET /_vanilli/captures/:captureId/all - Every capture, oldest first
pub fn handle_get_all(capture_id: &str, registry: Arc<StubRegistry>) -> Response<Full<Bytes>> {
    match registry.get_captures(capture_id) {
        Some(captures) => json_response(StatusCode::OK, &captures),
        None => capture_not_found(capture_id),
    }
}

fn capture_not_found(capture_id: &str) -> Response<Full<Bytes>> {
    error_response(
        StatusCode::NOT_FOUND,
        &format!("No capture recorded for '{capture_id}'"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::RequestView;
    use http_body_util::BodyExt;

    fn registry_with_captures() -> Arc<StubRegistry> {
        let registry = Arc::new(StubRegistry::new());
        registry
            .add_stub(
                serde_json::from_value(serde_json::json!({
                    "criteria": {"url": "/c"},
                    "response": {"status": 200},
                    "captureId": "c1"
                }))
                .unwrap(),
            )
            .unwrap();
        for n in ["1", "2"] {
            registry.find_match_for(&RequestView::new("GET", "/c").with_query("n", n));
        }
        registry
    }

    #[tokio::test]
    async fn test_latest_capture() {
        let resp = handle_get_latest("c1", registry_with_captures());
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["query"]["n"], "2");
    }

    #[tokio::test]
    async fn test_all_captures() {
        let resp = handle_get_all("c1", registry_with_captures());
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[0]["query"]["n"], "1");
    }

    #[test]
    fn test_unknown_capture() {
        let registry = registry_with_captures();
        assert_eq!(
            handle_get_latest("nope", Arc::clone(&registry)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(handle_get_all("nope", registry).status(), StatusCode::NOT_FOUND);
    }
}
