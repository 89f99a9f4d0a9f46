//! Route dispatch logic.
//!
//! Paths under `/_vanilli/` go to the admin handlers; everything else is matched
//! against the registered stubs.

use crate::admin_api::handlers::{captures, stubs, system};
use crate::admin_api::types::not_found;
use crate::stub::{handle_stub_request, StubRegistry};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::debug;

/// Prefix reserved for administration endpoints
pub const ADMIN_PREFIX: &str = "/_vanilli/";

/// Parsed admin route (segments after `/_vanilli/`)
#[derive(Debug, PartialEq)]
enum AdminRoute {
    /// POST/DELETE /_vanilli/stubs
    Stubs,
    /// GET /_vanilli/stubs/:id
    StubById(String),
    /// GET /_vanilli/verify
    Verify,
    /// GET /_vanilli/captures/:captureId
    Capture(String),
    /// GET /_vanilli/captures/:captureId/all
    AllCaptures(String),
    /// GET /_vanilli/health
    Health,
}

impl AdminRoute {
    /// Parse route from path segments after `/_vanilli/`
    fn parse(segments: &[&str]) -> Option<Self> {
        match segments {
            ["stubs"] => Some(AdminRoute::Stubs),
            ["stubs", id] if !id.is_empty() => Some(AdminRoute::StubById(decode(id))),
            ["verify"] => Some(AdminRoute::Verify),
            ["captures", id] if !id.is_empty() => Some(AdminRoute::Capture(decode(id))),
            ["captures", id, "all"] if !id.is_empty() => {
                Some(AdminRoute::AllCaptures(decode(id)))
            }
            ["health"] => Some(AdminRoute::Health),
            _ => None,
        }
    }
}

fn decode(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// Main request router
pub async fn route_request(
    req: Request<Incoming>,
    registry: Arc<StubRegistry>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let path = req.uri().path().to_string();

    let Some(rest) = path.strip_prefix(ADMIN_PREFIX) else {
        return Ok(handle_stub_request(req, registry).await);
    };

    let method = req.method().clone();
    debug!("Admin API: {} {}", method, path);

    let segments: Vec<&str> = rest.trim_end_matches('/').split('/').collect();
    let Some(route) = AdminRoute::parse(&segments) else {
        return Ok(not_found());
    };

    let response = match (&method, route) {
        (&Method::POST, AdminRoute::Stubs) => stubs::handle_add(req, registry).await,
        (&Method::DELETE, AdminRoute::Stubs) => stubs::handle_clear(registry),
        (&Method::GET, AdminRoute::StubById(id)) => stubs::handle_get(&id, registry),
        (&Method::GET, AdminRoute::Verify) => stubs::handle_verify(registry),
        (&Method::GET, AdminRoute::Capture(id)) => captures::handle_get_latest(&id, registry),
        (&Method::GET, AdminRoute::AllCaptures(id)) => captures::handle_get_all(&id, registry),
        (&Method::GET, AdminRoute::Health) => system::handle_health(registry),
        _ => not_found(),
    };
    Ok(response)
}
