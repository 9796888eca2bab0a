//! Ranking index of cities by total score.

use metrics::gauge;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;
use crate::storage::StorageBackend;

/// One position in the ranking, 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCity {
    pub rank: usize,
    pub city: String,
    pub total_score: f64,
}

/// Ranking index over the shared storage backend.
#[derive(Clone)]
pub struct RankingIndex {
    backend: Arc<dyn StorageBackend>,
}

impl RankingIndex {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Set the city's score, replacing its previous position.
    pub async fn upsert(&self, city: &str, score: f64) -> Result<()> {
        self.backend.upsert_rank(city, score).await?;
        gauge!("mi8_ranking_total_score", "city" => city.to_string()).set(score);
        Ok(())
    }

    /// Highest scores first, ties by descending city key, at most `limit`.
    pub async fn top_n(&self, limit: usize) -> Result<Vec<RankedCity>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let entries = self.backend.top_ranked(limit).await?;
        Ok(entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| RankedCity {
                rank: i + 1,
                city: entry.city,
                total_score: entry.score,
            })
            .collect())
    }
}
