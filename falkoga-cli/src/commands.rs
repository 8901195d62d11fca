use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use falkoga_config::{FalkogaConfig, GeneratorConfig};
use falkoga_engine::Runtime;
use falkoga_generator::{EventCallback, Generator};

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the event pipeline with the HTTP/WebSocket boundary
    Serve(ServeArgs),
    /// Run the generator standalone and print events as JSON lines
    Generate(GenerateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Configuration file; defaults to the config/ hierarchy
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// How long to keep generating
    #[arg(long, default_value_t = 10)]
    pub seconds: u64,
}

pub async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = match &args.config {
        Some(path) => FalkogaConfig::load_from_path(path)?,
        None => FalkogaConfig::load()?,
    };
    let listen = config.server.listen.clone();

    let runtime = Runtime::start(config).await;
    let server = tokio::spawn(falkoga_server::serve(runtime.clone(), listen));

    tokio::signal::ctrl_c().await?;
    info!("interrupt received, draining");
    runtime.shutdown().await;
    server.abort();
    Ok(())
}

pub async fn run_generate(
    args: GenerateArgs,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let generator = Generator::new(GeneratorConfig::default());
    let callback: EventCallback = Arc::new(|events| {
        for event in &events {
            if let Ok(line) = serde_json::to_string(event) {
                println!("{line}");
            }
        }
    });

    let handle = generator.start(callback);
    tokio::time::sleep(Duration::from_secs(args.seconds)).await;
    handle.stop();
    Ok(())
}
