//! Configuration types for the Vanilli server.

mod listen;
mod logging;

use std::path::Path;

use crate::stub::StubDefinition;
use serde::Deserialize;

pub use listen::ListenConfig;
pub use logging::{LogConfig, LogFormat};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub log: LogConfig,
    /// Stubs registered at start-up, before the first request is served
    #[serde(default)]
    pub stubs: Vec<StubDefinition>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, anyhow::Error> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.listen.socket_addr()?;

        if self.log.level.trim().is_empty() {
            anyhow::bail!("log.level must not be empty");
        }

        Ok(())
    }
}
