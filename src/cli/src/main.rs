//! MI8 CLI - Command-line interface for the MI8 city scoring service.
//!
//! Provides commands for publishing news, reading city scores and rankings,
//! and checking server health.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{city, health, news};
use output::OutputFormat;

/// MI8 - city scoring and news ranking CLI
#[derive(Parser)]
#[command(
    name = "mi8",
    version,
    about = "MI8 - city scoring and news ranking",
    long_about = "CLI tool for publishing news events and inspecting city scores and rankings.",
    propagate_version = true
)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    output: OutputFormat,

    /// API server URL
    #[arg(
        long,
        global = true,
        env = "MI8_API_URL",
        default_value = "http://localhost:8080"
    )]
    api_url: String,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish and list news events
    #[command(subcommand)]
    News(news::NewsCommands),

    /// City scores and rankings
    #[command(subcommand)]
    City(city::CityCommands),

    /// Check server health
    Health(health::HealthArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let client = client::ApiClient::new(&cli.api_url)?;
    let format = cli.output;

    let result = match cli.command {
        Commands::News(cmd) => news::execute(cmd, &client, format).await,
        Commands::City(cmd) => city::execute(cmd, &client, format).await,
        Commands::Health(args) => health::execute(args, &client, format).await,
    };

    if let Err(e) = result {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
