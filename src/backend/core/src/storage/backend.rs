//! The storage backend trait.
//!
//! One capability set hosts the whole persisted layout: the event records and
//! their time indices, the per-city ledgers and the ranking index. Components
//! receive an `Arc<dyn StorageBackend>` and stay agnostic of the variant.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::Result;
use crate::events::NewsEvent;
use crate::scoring::ImpactVector;

/// Raw ledger state for one city. Accumulators are signed and unclamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub country: Option<String>,
    pub accumulators: [i64; 4],
    pub last_updated: Option<String>,
}

impl LedgerRecord {
    /// A fresh record at the baseline.
    pub fn baseline(country: Option<String>, baseline: i64) -> Self {
        Self {
            country,
            accumulators: [baseline; 4],
            last_updated: None,
        }
    }

    /// Add a delta to every accumulator and stamp the update time.
    pub fn apply(&mut self, delta: &ImpactVector, updated_at: &str) {
        for (acc, d) in self.accumulators.iter_mut().zip(delta.0) {
            *acc += d;
        }
        self.last_updated = Some(updated_at.to_string());
    }
}

/// One ranking index position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    pub city: String,
    pub score: f64,
}

impl RankEntry {
    /// Ranking order: highest score first, ties by descending city key.
    ///
    /// Matches the member order of a sorted-set reverse range.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.city.cmp(&self.city))
    }
}

/// Trait for storage backends.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Append an event to the record store, the global index and, when the
    /// event has a city, that city's index. All three become visible together.
    ///
    /// Returns the event with its ordering sequence assigned.
    async fn append_event(&self, event: NewsEvent) -> Result<NewsEvent>;

    /// Newest events first, at most `limit`.
    async fn latest_events(&self, limit: usize) -> Result<Vec<NewsEvent>>;

    /// Newest events for a city (case-insensitive), at most `limit`.
    async fn latest_events_for_city(&self, city: &str, limit: usize) -> Result<Vec<NewsEvent>>;

    /// Create the city's ledger at `baseline` if absent, and record `country`
    /// if no country is recorded yet. Idempotent.
    async fn init_ledger(&self, city: &str, country: &str, baseline: i64) -> Result<()>;

    /// Atomically add `delta` to the city's accumulators and stamp `updated_at`.
    async fn increment_ledger(&self, city: &str, delta: &ImpactVector, updated_at: &str) -> Result<()>;

    /// Raw ledger state, `None` when the city was never scored.
    async fn read_ledger(&self, city: &str) -> Result<Option<LedgerRecord>>;

    /// Set the city's ranking score, replacing any previous one.
    async fn upsert_rank(&self, city: &str, score: f64) -> Result<()>;

    /// Highest-ranked cities first, at most `limit`.
    async fn top_ranked(&self, limit: usize) -> Result<Vec<RankEntry>>;

    /// Check the backend is reachable.
    async fn ping(&self) -> Result<()>;

    /// Get the backend name.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_apply_keeps_signed_values() {
        let mut record = LedgerRecord::baseline(Some("Germany".into()), 100);
        record.apply(&ImpactVector::new(-150, 0, 10, -100), "2024-01-01");
        assert_eq!(record.accumulators, [-50, 100, 110, 0]);
        record.apply(&ImpactVector::new(80, 0, 0, 0), "2024-01-02");
        assert_eq!(record.accumulators[0], 30);
        assert_eq!(record.last_updated.as_deref(), Some("2024-01-02"));
    }

    #[test]
    fn test_rank_order() {
        let mut entries = vec![
            RankEntry { city: "a".into(), score: 10.0 },
            RankEntry { city: "c".into(), score: 20.0 },
            RankEntry { city: "b".into(), score: 10.0 },
        ];
        entries.sort_by(RankEntry::rank_cmp);
        let cities: Vec<_> = entries.iter().map(|e| e.city.as_str()).collect();
        assert_eq!(cities, vec!["c", "b", "a"]);
    }
}
