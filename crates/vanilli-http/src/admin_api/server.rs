//! Vanilli server.

use crate::admin_api::router::route_request;
use crate::stub::StubRegistry;
use anyhow::Context;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// HTTP server answering admin calls and stubbed requests on one port
pub struct VanilliServer {
    listener: TcpListener,
    registry: Arc<StubRegistry>,
}

impl VanilliServer {
    /// Bind the listener. Port 0 picks a free port; see [`VanilliServer::local_addr`].
    pub async fn bind(addr: SocketAddr, registry: Arc<StubRegistry>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        Ok(Self { listener, registry })
    }

    /// Address the server is actually listening on
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read listener address")
    }

    /// Registry shared with every request handler
    pub fn registry(&self) -> Arc<StubRegistry> {
        Arc::clone(&self.registry)
    }

    /// Accept connections until the task is dropped
    pub async fn run(self) -> anyhow::Result<()> {
        info!("Vanilli listening on http://{}", self.local_addr()?);

        loop {
            let (stream, addr) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("Accept error: {}", e);
                    continue;
                }
            };
            let io = TokioIo::new(stream);
            let registry = Arc::clone(&self.registry);

            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let registry = Arc::clone(&registry);
                    async move { route_request(req, registry).await }
                });

                // Failures writing a response are dropped; the match stays recorded.
                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    debug!("Connection error from {}: {}", addr, e);
                }
            });
        }
    }
}
