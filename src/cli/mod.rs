//! # CLI
//!
//! Parses arguments, loads configuration, and dispatches to the server.
//! The demo server runs the in-memory engine; production deployments bind
//! their own `StorageEngine` through the library API.

pub mod args;

use std::path::Path;

use thiserror::Error;

use crate::config::{ConfigError, GatewayConfig};
use crate::gateway::{Gateway, GatewayServer, MemoryEngine, PrimaryKeys};

use args::{Cli, Command};

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Entry point: parse arguments and run the selected command
pub fn run() -> Result<(), CliError> {
    let cli = Cli::parse_args();
    match cli.command {
        Command::Start { config } => start(&config),
        Command::CheckConfig { config } => check_config(&config),
    }
}

fn load_or_default(path: &Path) -> Result<GatewayConfig, ConfigError> {
    if path.exists() {
        GatewayConfig::load(path)
    } else {
        Ok(GatewayConfig::default())
    }
}

fn start(path: &Path) -> Result<(), CliError> {
    let config = load_or_default(path)?;

    let mut engine = MemoryEngine::new();
    for (table, column) in &config.primary_keys {
        engine = engine.with_key_column(table, column);
    }
    let primary_keys = PrimaryKeys::from_map(config.primary_keys.clone());
    let server = GatewayServer::new(Gateway::new(engine, primary_keys), config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn check_config(path: &Path) -> Result<(), CliError> {
    let config = load_or_default(path)?;
    let rendered = serde_json::to_string_pretty(&config).map_err(ConfigError::Parse)?;
    println!("{}", rendered);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_or_default_without_file() {
        let config = load_or_default(Path::new("/nonexistent/restgate.json")).unwrap();
        assert_eq!(config.mount, "rest");
    }

    #[test]
    fn test_check_config_with_default() {
        check_config(Path::new("/nonexistent/restgate.json")).unwrap();
    }
}
