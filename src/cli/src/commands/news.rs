//! News commands.
//!
//! Publish an event and list the newest events, globally or for one city.

use anyhow::Result;
use clap::Subcommand;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::client::{city_path, ApiClient};
use crate::output::{self, OutputFormat};

#[derive(Subcommand)]
pub enum NewsCommands {
    /// Publish a news event
    Publish {
        /// Headline
        #[arg(short, long)]
        name: String,

        /// Source label
        #[arg(short, long, default_value = "")]
        source: String,

        /// City the event concerns; omit for global news
        #[arg(short, long, default_value = "")]
        city: String,

        /// Country of the city
        #[arg(long, default_value = "")]
        country: String,

        /// Event date (defaults to now)
        #[arg(short, long)]
        date: Option<String>,

        /// Tags, repeatable or comma-separated
        #[arg(short, long = "tag", value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// List the newest events
    Latest {
        /// Only events for this city
        #[arg(short, long)]
        city: Option<String>,

        /// Maximum number of results
        #[arg(short, long, default_value = "10")]
        limit: u32,
    },
}

// ── API types ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct PublishRequest {
    name: String,
    source: String,
    city: String,
    country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    tags: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
struct NewsEvent {
    id: String,
    #[serde(default)]
    sequence: u64,
    name: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Serialize, Tabled)]
struct NewsRow {
    #[tabled(rename = "#")]
    sequence: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

impl From<NewsEvent> for NewsRow {
    fn from(e: NewsEvent) -> Self {
        let city = if e.country.is_empty() {
            e.city
        } else {
            format!("{} ({})", e.city, e.country)
        };
        Self {
            sequence: e.sequence,
            name: e.name,
            city,
            source: e.source,
            date: e.date,
            tags: e.tags.join(", "),
        }
    }
}

// ── Execution ───────────────────────────────────────────────────────────────

pub async fn execute(cmd: NewsCommands, client: &ApiClient, format: OutputFormat) -> Result<()> {
    match cmd {
        NewsCommands::Publish {
            name,
            source,
            city,
            country,
            date,
            tags,
        } => {
            let body = PublishRequest {
                name,
                source,
                city,
                country,
                date,
                tags: tags
                    .into_iter()
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect(),
            };

            let event: NewsEvent = client.post("/api/v1/news", &body).await?;

            match format {
                OutputFormat::Table => {
                    output::print_success("News event published");
                    output::print_detail("ID", &event.id);
                    output::print_detail("Sequence", &event.sequence.to_string());
                    if !event.city.is_empty() {
                        output::print_detail("City", &event.city);
                    }
                    output::print_detail("Date", &event.date);
                    output::print_detail("Tags", &event.tags.join(", "));
                }
                _ => output::print_item(&event, format)?,
            }
        }

        NewsCommands::Latest { city, limit } => {
            let path = match &city {
                Some(c) => format!("{}?limit={}", city_path(c, "news"), limit),
                None => format!("/api/v1/news/latest?limit={}", limit),
            };

            let events: Vec<NewsEvent> = client.get(&path).await?;
            match format {
                OutputFormat::Table => {
                    let rows: Vec<NewsRow> = events.into_iter().map(NewsRow::from).collect();
                    output::print_list(&rows, format)?;
                }
                _ => output::print_item(&events, format)?,
            }
        }
    }

    Ok(())
}
