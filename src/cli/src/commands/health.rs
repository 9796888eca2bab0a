//! Health check command.
//!
//! Queries the `/health` endpoint and displays the server status.

use anyhow::Result;
use clap::Args;

use crate::client::ApiClient;
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct HealthArgs {
    /// Exit with an error when the server is degraded
    #[arg(long)]
    strict: bool,
}

pub async fn execute(args: HealthArgs, client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health: serde_json::Value = client.get_raw("/health").await?;
    let status = health
        .get("status")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();

    match format {
        OutputFormat::Table => {
            output::print_header("System Health");
            output::print_detail("Status", &status);
            output::print_detail("API URL", client.base_url());

            for (label, key) in [("Backend", "backend"), ("Version", "version"), ("Timestamp", "timestamp")] {
                if let Some(value) = health.get(key).and_then(|v| v.as_str()) {
                    output::print_detail(label, value);
                }
            }

            if status == "healthy" {
                output::print_success("All systems operational");
            } else {
                let reason = health.get("error").and_then(|v| v.as_str()).unwrap_or("unknown");
                output::print_error(&format!("System status: {} ({})", status, reason));
            }
        }
        _ => output::print_item(&health, format)?,
    }

    if args.strict && status != "healthy" {
        anyhow::bail!("server is {}", status);
    }
    Ok(())
}
