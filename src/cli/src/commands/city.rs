//! City score and ranking commands.

use anyhow::Result;
use clap::Subcommand;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::client::{city_path, ApiClient};
use crate::output::{self, OutputFormat};

#[derive(Subcommand)]
pub enum CityCommands {
    /// Show a city's score card
    Score {
        /// City name, as published
        city: String,
    },

    /// Show the top-ranked cities
    Top {
        /// Maximum number of results
        #[arg(short, long, default_value = "10")]
        limit: u32,

        /// Include per-dimension scores
        #[arg(short, long)]
        detailed: bool,
    },
}

// ── API types ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize)]
struct CityScore {
    city: String,
    country: Option<String>,
    safety: u64,
    economy: u64,
    quality_of_life: u64,
    culture: u64,
    last_updated: Option<String>,
}

impl CityScore {
    fn total(&self) -> u64 {
        self.safety + self.economy + self.quality_of_life + self.culture
    }
}

#[derive(Debug, Deserialize, Serialize, Tabled)]
struct RankedCity {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "Total")]
    total_score: f64,
}

#[derive(Debug, Serialize, Tabled)]
struct ScoreRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "Country")]
    country: String,
    #[tabled(rename = "Safety")]
    safety: String,
    #[tabled(rename = "Economy")]
    economy: String,
    #[tabled(rename = "QoL")]
    quality_of_life: String,
    #[tabled(rename = "Culture")]
    culture: String,
    #[tabled(rename = "Total")]
    total: u64,
}

// ── Execution ───────────────────────────────────────────────────────────────

pub async fn execute(cmd: CityCommands, client: &ApiClient, format: OutputFormat) -> Result<()> {
    match cmd {
        CityCommands::Score { city } => {
            let score: CityScore = client
                .get(&city_path(&city, "score"))
                .await?;

            match format {
                OutputFormat::Table => {
                    output::print_header(&format!("City: {}", score.city));
                    if let Some(country) = &score.country {
                        output::print_detail("Country", country);
                    }
                    output::print_detail("Safety", &output::score_cell(score.safety));
                    output::print_detail("Economy", &output::score_cell(score.economy));
                    output::print_detail("Quality of life", &output::score_cell(score.quality_of_life));
                    output::print_detail("Culture", &output::score_cell(score.culture));
                    output::print_detail("Total", &score.total().to_string());
                    if let Some(updated) = &score.last_updated {
                        output::print_detail("Last updated", updated);
                    }
                }
                _ => output::print_item(&score, format)?,
            }
        }

        CityCommands::Top { limit, detailed } => {
            if detailed {
                let scores: Vec<CityScore> = client
                    .get(&format!("/api/v1/rankings/scores?limit={}", limit))
                    .await?;

                match format {
                    OutputFormat::Table => {
                        let rows: Vec<ScoreRow> = scores
                            .into_iter()
                            .enumerate()
                            .map(|(i, s)| ScoreRow {
                                rank: i + 1,
                                total: s.total(),
                                safety: output::score_cell(s.safety),
                                economy: output::score_cell(s.economy),
                                quality_of_life: output::score_cell(s.quality_of_life),
                                culture: output::score_cell(s.culture),
                                country: s.country.unwrap_or_default(),
                                city: s.city,
                            })
                            .collect();
                        output::print_list(&rows, format)?;
                    }
                    _ => output::print_item(&scores, format)?,
                }
            } else {
                let ranked: Vec<RankedCity> = client
                    .get(&format!("/api/v1/rankings?limit={}", limit))
                    .await?;
                output::print_list(&ranked, format)?;
            }
        }
    }

    Ok(())
}
