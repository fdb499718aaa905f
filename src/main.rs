//! training-mapper CLI entry point
//!
//! Training center discovery - CLI + web app

use training_mapper::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
