//! CLI argument definitions using clap
//!
//! Commands:
//! - restgate start --config <path>
//! - restgate check-config --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// restgate - a generic REST-to-SQL gateway
#[derive(Parser, Debug)]
#[command(name = "restgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the gateway server
    Start {
        /// Path to configuration file
        #[arg(long, default_value = "./restgate.json")]
        config: PathBuf,
    },

    /// Validate a configuration file and print the resolved settings
    CheckConfig {
        /// Path to configuration file
        #[arg(long, default_value = "./restgate.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_defaults() {
        let cli = Cli::parse_from(["restgate", "start"]);
        match cli.command {
            Command::Start { config } => {
                assert_eq!(config, PathBuf::from("./restgate.json"));
            }
            _ => panic!("expected start command"),
        }
    }

    #[test]
    fn test_check_config_with_path() {
        let cli = Cli::parse_from(["restgate", "check-config", "--config", "/tmp/g.json"]);
        match cli.command {
            Command::CheckConfig { config } => {
                assert_eq!(config, PathBuf::from("/tmp/g.json"));
            }
            _ => panic!("expected check-config command"),
        }
    }
}
