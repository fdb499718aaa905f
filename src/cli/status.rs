//! Status command handler
//!
//! Shows configuration status and, optionally, whether a server is up.

use crate::config::Config;
use crate::error::Result;
use clap::Args;

/// Status command arguments
#[derive(Args)]
pub struct StatusArgs {
    /// Check if server is running (calls its /health endpoint)
    #[arg(long)]
    pub server: bool,
}

/// Run the status command
pub async fn run(args: StatusArgs) -> Result<()> {
    let config = Config::load_resolved()?;

    println!("training-mapper v{}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("Config: {}", Config::config_path()?.display());
    println!("Model: {}", config.gemini.model);
    println!(
        "API key: {}",
        if config.has_api_key() {
            "configured"
        } else {
            "NOT CONFIGURED (set GEMINI_API_KEY)"
        }
    );
    println!("Query interval: {}ms", config.search.query_interval_ms);
    println!();

    if args.server {
        check_server_status(&config).await;
    }

    Ok(())
}

/// Check if the server is running
async fn check_server_status(config: &Config) {
    let url = format!("http://{}/health", config.server_addr());

    match reqwest::get(&url).await {
        Ok(response) => {
            let code = response.status();
            let body = response
                .text()
                .await
                .ok()
                .and_then(|body| serde_json::from_str::<serde_json::Value>(&body).ok());

            if code.is_success() {
                println!("Server: RUNNING on {}", config.server_addr());
                if let Some(model) = body
                    .as_ref()
                    .and_then(|b| b.pointer("/model/displayName"))
                    .and_then(|v| v.as_str())
                {
                    println!("  Model: {}", model);
                }
            } else {
                println!("Server: UNHEALTHY (status {})", code);
                if let Some(error) = body
                    .as_ref()
                    .and_then(|b| b.get("error"))
                    .and_then(|v| v.as_str())
                {
                    println!("  Error: {}", error);
                }
            }
        }
        Err(_) => {
            println!("Server: NOT RUNNING on {}", config.server_addr());
        }
    }
    println!();
}
