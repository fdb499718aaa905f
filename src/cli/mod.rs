//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod diagnose;
pub mod extract;
pub mod serve;
pub mod status;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Training center discovery for a map rectangle
#[derive(Parser)]
#[command(name = "training-mapper")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Extract training centers for a rectangle
    Extract(extract::ExtractArgs),

    /// Check connectivity to every external service
    Diagnose(diagnose::DiagnoseArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Show configuration and server status
    Status(status::StatusArgs),
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => serve::run(args).await,
        Commands::Extract(args) => extract::run(args).await,
        Commands::Diagnose(args) => diagnose::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Status(args) => status::run(args).await,
    }
}

/// Initialize logging to stderr
///
/// `default` applies when `RUST_LOG` is unset.
pub(crate) fn init_logging(default: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_extract() {
        let cli = Cli::try_parse_from([
            "training-mapper",
            "extract",
            "--north",
            "40.8",
            "--south",
            "40.7",
            "--east=-73.9",
            "--west=-74.1",
            "-f",
            "csv",
        ])
        .unwrap();

        match cli.command {
            Commands::Extract(args) => {
                assert_eq!(args.north, 40.8);
                assert_eq!(args.west, -74.1);
                assert_eq!(args.format.as_deref(), Some("csv"));
            }
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn test_parse_serve_port() {
        let cli = Cli::try_parse_from(["training-mapper", "serve", "-p", "9000"]).unwrap();
        match cli.command {
            Commands::Serve(args) => assert_eq!(args.port, Some(9000)),
            _ => panic!("expected serve"),
        }
    }
}
