//! ## falkoga-cli
//! **Operational entrypoint**
//!
//! Two modes: `serve` runs the full pipeline with the HTTP/WebSocket
//! boundary until interrupted; `generate` runs the generator standalone
//! and prints newline-delimited event JSON for inspection.

use clap::Parser;
use falkoga_telemetry::logging::EventLogger;

mod commands;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    EventLogger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(serve_args) => commands::run_serve(serve_args).await,
        Commands::Generate(generate_args) => commands::run_generate(generate_args).await,
    }
}
