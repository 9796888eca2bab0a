//! In-memory storage backend.
//!
//! Process-local variant of the persisted layout, used for tests, demos and
//! single-instance deployments. Events live in one append-only log behind a
//! read-write lock; ledgers live in a sharded map so increments for different
//! cities never contend; the ranking index is a small score map sorted on read.

use async_trait::async_trait;
use dashmap::DashMap;
use metrics::counter;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

use super::backend::{LedgerRecord, RankEntry, StorageBackend};
use crate::error::Result;
use crate::events::{fold_city, NewsEvent};
use crate::scoring::ImpactVector;

#[derive(Default)]
struct EventLog {
    /// Events in append order; position + 1 is the sequence
    records: Vec<NewsEvent>,

    /// Folded city -> positions in `records`, ascending
    by_city: HashMap<String, Vec<usize>>,
}

/// In-memory storage backend.
#[derive(Default)]
pub struct InMemoryBackend {
    events: RwLock<EventLog>,
    ledgers: DashMap<String, LedgerRecord>,
    ranking: RwLock<HashMap<String, f64>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn event_count(&self) -> usize {
        self.events.read().records.len()
    }

    #[cfg(test)]
    fn ledger_count(&self) -> usize {
        self.ledgers.len()
    }
}

#[async_trait]
impl StorageBackend for InMemoryBackend {
    async fn append_event(&self, mut event: NewsEvent) -> Result<NewsEvent> {
        let mut log = self.events.write();
        let position = log.records.len();
        event.sequence = position as u64 + 1;

        if let Some(city) = event.city_key() {
            log.by_city.entry(fold_city(city)).or_default().push(position);
        }
        log.records.push(event.clone());
        drop(log);

        counter!("mi8_storage_operations_total", "backend" => "in_memory", "operation" => "append_event")
            .increment(1);
        debug!(event_id = %event.id, sequence = event.sequence, "Appended event");
        Ok(event)
    }

    async fn latest_events(&self, limit: usize) -> Result<Vec<NewsEvent>> {
        let log = self.events.read();
        Ok(log.records.iter().rev().take(limit).cloned().collect())
    }

    async fn latest_events_for_city(&self, city: &str, limit: usize) -> Result<Vec<NewsEvent>> {
        let log = self.events.read();
        let events = log
            .by_city
            .get(&fold_city(city))
            .map(|positions| {
                positions
                    .iter()
                    .rev()
                    .take(limit)
                    .map(|&p| log.records[p].clone())
                    .collect()
            })
            .unwrap_or_default();
        Ok(events)
    }

    async fn init_ledger(&self, city: &str, country: &str, baseline: i64) -> Result<()> {
        let country = (!country.is_empty()).then(|| country.to_string());
        self.ledgers
            .entry(city.to_string())
            .and_modify(|record| {
                if record.country.is_none() {
                    record.country = country.clone();
                }
            })
            .or_insert_with(|| LedgerRecord::baseline(country.clone(), baseline));
        Ok(())
    }

    async fn increment_ledger(&self, city: &str, delta: &ImpactVector, updated_at: &str) -> Result<()> {
        // The entry guard holds the shard lock, so the increment is atomic.
        let mut record = self
            .ledgers
            .entry(city.to_string())
            .or_insert_with(|| LedgerRecord::baseline(None, 0));
        record.apply(delta, updated_at);
        Ok(())
    }

    async fn read_ledger(&self, city: &str) -> Result<Option<LedgerRecord>> {
        Ok(self.ledgers.get(city).map(|r| r.value().clone()))
    }

    async fn upsert_rank(&self, city: &str, score: f64) -> Result<()> {
        self.ranking.write().insert(city.to_string(), score);
        Ok(())
    }

    async fn top_ranked(&self, limit: usize) -> Result<Vec<RankEntry>> {
        let mut entries: Vec<RankEntry> = self
            .ranking
            .read()
            .iter()
            .map(|(city, score)| RankEntry {
                city: city.clone(),
                score: *score,
            })
            .collect();
        entries.sort_by(RankEntry::rank_cmp);
        entries.truncate(limit);
        Ok(entries)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}
