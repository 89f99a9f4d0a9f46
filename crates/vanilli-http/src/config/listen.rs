//! Listen configuration.

use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ListenConfig {
    /// Address to bind, e.g. "127.0.0.1" for local-only access
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind; 0 picks a free port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    14000
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ListenConfig {
    /// Socket address to bind
    pub fn socket_addr(&self) -> Result<SocketAddr, anyhow::Error> {
        let host = if self.host == "localhost" {
            "127.0.0.1"
        } else {
            self.host.as_str()
        };
        let ip: IpAddr = host
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen.host '{}': {e}", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
