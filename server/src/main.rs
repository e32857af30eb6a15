mod config;
mod http;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use platform_obs::{ObsConfig, init_tracing, shutdown_tracing};
use platform_store::Directory;
use tracing::info;

use crate::{
    config::AppConfig,
    http::{AppState, ServeConfig},
};

#[derive(Parser, Debug)]
#[command(name = "directory-server", version, about = "Read-only employee directory API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server.
    Serve(ServeCommand),
    /// Load and validate the directory source, then exit.
    Check,
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, default_value = "0.0.0.0")]
    host: std::net::IpAddr,
    #[arg(long, default_value_t = 8000)]
    port: u16,
}

impl From<ServeCommand> for ServeConfig {
    fn from(value: ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(ObsConfig::server())?;
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    let result = match cli.command {
        Command::Serve(cmd) => run_server(cmd, config).await,
        Command::Check => check_source(&config),
    };
    shutdown_tracing();
    result
}

fn load_directory(config: &AppConfig) -> Result<Directory> {
    Directory::load(&config.store).with_context(|| {
        format!(
            "could not load directory source {}",
            config.store.path().display()
        )
    })
}

async fn run_server(cmd: ServeCommand, config: AppConfig) -> Result<()> {
    let directory = load_directory(&config)?;
    let state = AppState::new(directory, config);
    http::serve(cmd.into(), state).await
}

fn check_source(config: &AppConfig) -> Result<()> {
    let directory = load_directory(config)?;
    info!(
        employees = directory.len(),
        created_by = directory.created_by().unwrap_or("unknown"),
        "directory source is valid"
    );
    Ok(())
}
