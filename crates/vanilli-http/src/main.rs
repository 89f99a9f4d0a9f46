use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use vanilli_http::config::Config;
use vanilli_http::{logging, StubRegistry, VanilliServer};

/// Vanilli HTTP test double
#[derive(Parser, Debug)]
#[command(name = "vanilli", author, version, about)]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "VANILLI_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides the config file)
    #[arg(long, env = "VANILLI_HOST")]
    host: Option<String>,

    /// YAML config file with listen/log settings and initial stubs
    #[arg(short, long, env = "VANILLI_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "vanilli_http=trace"
    #[arg(long, env = "VANILLI_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match args.config {
        Some(ref path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(port) = args.port {
        config.listen.port = port;
    }
    if let Some(host) = args.host {
        config.listen.host = host;
    }
    if let Some(level) = args.log_level {
        config.log.level = level;
    }
    config.validate()?;

    logging::init(&config.log)?;

    let registry = Arc::new(StubRegistry::new());
    if !config.stubs.is_empty() {
        let stubs = registry
            .add_stubs(config.stubs)
            .context("Invalid stub in config file")?;
        info!("Registered {} stub(s) from config", stubs.len());
    }

    let server = VanilliServer::bind(config.listen.socket_addr()?, registry).await?;

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            Ok(())
        }
    }
}
