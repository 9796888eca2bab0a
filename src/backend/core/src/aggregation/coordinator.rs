//! The ingestion protocol.
//!
//! ```text
//! ingest(draft)
//!   1. append to the event store          -- failure aborts the call
//!   2. delta = impact_of(tags)            -- cityless events stop after 1
//!   3. ensure ledger initialised          -+
//!   4. apply delta                         | serialised per city,
//!   5. read clamped scores, sum the total  | best-effort after 1
//!   6. upsert the total into the ranking  -+
//! ```

use dashmap::DashMap;
use metrics::counter;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::error::{ErrorCode, Mi8Error, Result};
use crate::events::{EventStore, NewsDraft, NewsEvent};
use crate::ledger::{CityScore, ScoreLedger};
use crate::ranking::RankingIndex;
use crate::scoring::impact_of;
use crate::storage::StorageBackend;

/// Outcome of the scoring half of an ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoringOutcome {
    /// The event has no city.
    Skipped,
    /// Ledger and ranking reflect the event.
    Scored { total: u64 },
    /// The event is stored but the ledger or ranking may be stale.
    Failed { code: ErrorCode },
}

/// Result of one ingestion.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub event: NewsEvent,
    pub scoring: ScoringOutcome,
}

/// Drives event ingestion through the store, ledger and ranking index.
pub struct AggregationCoordinator {
    events: EventStore,
    ledger: ScoreLedger,
    ranking: RankingIndex,
    /// One lock per city ever scored; entries live as long as the coordinator,
    /// so the map is bounded by the number of ledgers.
    city_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl AggregationCoordinator {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::from_parts(
            EventStore::new(backend.clone()),
            ScoreLedger::new(backend.clone()),
            RankingIndex::new(backend),
        )
    }

    pub fn from_parts(events: EventStore, ledger: ScoreLedger, ranking: RankingIndex) -> Self {
        Self {
            events,
            ledger,
            ranking,
            city_locks: DashMap::new(),
        }
    }

    pub fn events(&self) -> &EventStore {
        &self.events
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn ranking(&self) -> &RankingIndex {
        &self.ranking
    }

    /// Store an event and fold it into its city's scores.
    ///
    /// Fails only when the event itself could not be stored. A scoring failure
    /// after that is logged and reported in [`IngestReport::scoring`].
    #[instrument(skip(self, draft), fields(city = %draft.city))]
    pub async fn ingest(&self, draft: NewsDraft) -> Result<IngestReport> {
        let event = self.events.append(draft).await?;

        let scoring = match event.city_key() {
            None => {
                debug!(event_id = %event.id, "Event has no city, skipping scoring");
                ScoringOutcome::Skipped
            }
            Some(city) => match self.aggregate(city, &event).await {
                Ok(score) => ScoringOutcome::Scored {
                    total: score.total(),
                },
                Err(source) => {
                    let err = Mi8Error::with_internal(
                        ErrorCode::PostIngestAggregationFailure,
                        "Event stored but city scores were not updated",
                        source.to_string(),
                    )
                    .with_context("event_id", event.id.to_string())
                    .with_context("city", city)
                    .with_source(source);
                    err.log();
                    counter!("mi8_aggregation_failures_total").increment(1);
                    ScoringOutcome::Failed { code: err.code() }
                }
            },
        };

        let scored = matches!(scoring, ScoringOutcome::Scored { .. });
        counter!("mi8_events_ingested_total", "scored" => scored.to_string()).increment(1);
        info!(event_id = %event.id, sequence = event.sequence, scored, "Event ingested");

        Ok(IngestReport { event, scoring })
    }

    async fn aggregate(&self, city: &str, event: &NewsEvent) -> Result<CityScore> {
        let delta = impact_of(&event.tags);

        let lock = self.city_lock(city);
        let _guard = lock.lock().await;

        self.ledger.ensure_initialized(city, &event.country).await?;
        self.ledger.apply_delta(city, &delta, &event.date).await?;
        let score = self.ledger.read(city).await?;
        self.ranking.upsert(city, score.total() as f64).await?;

        if delta.is_zero() {
            warn_unrecognised(&event.tags);
        }
        debug!(city, total = score.total(), "City rescored");
        Ok(score)
    }

    fn city_lock(&self, city: &str) -> Arc<Mutex<()>> {
        self.city_locks
            .entry(city.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

fn warn_unrecognised(tags: &[String]) {
    if !tags.is_empty() {
        warn!(?tags, "No recognised tags on event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryBackend;

    fn coordinator() -> AggregationCoordinator {
        AggregationCoordinator::new(Arc::new(InMemoryBackend::new()))
    }

    #[tokio::test]
    async fn test_cityless_event_is_stored_but_not_scored() {
        let coordinator = coordinator();
        let report = coordinator
            .ingest(NewsDraft::new("Global news").tag("crisis"))
            .await
            .unwrap();

        assert_eq!(report.scoring, ScoringOutcome::Skipped);
        assert_eq!(coordinator.events().list_latest_global(10).await.unwrap().len(), 1);
        assert!(coordinator.ranking().top_n(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ingest_scores_city() {
        let coordinator = coordinator();
        let report = coordinator
            .ingest(NewsDraft::new("Breakthrough").located("A", "Aland").tag("innovation"))
            .await
            .unwrap();

        assert_eq!(report.scoring, ScoringOutcome::Scored { total: 4115 });
        let top = coordinator.ranking().top_n(1).await.unwrap();
        assert_eq!(top[0].city, "A");
        assert_eq!(top[0].total_score, 4115.0);
    }

    #[tokio::test]
    async fn test_unknown_tags_still_initialise_city() {
        let coordinator = coordinator();
        coordinator
            .ingest(NewsDraft::new("Weather").located("B", "").tag("sunny"))
            .await
            .unwrap();

        let score = coordinator.ledger().read("B").await.unwrap();
        assert_eq!(score.total(), 4000);
    }

    #[tokio::test]
    async fn test_ledger_timestamp_is_event_date() {
        let coordinator = coordinator();
        coordinator
            .ingest(
                NewsDraft::new("Gallery")
                    .located("C", "Cland")
                    .dated("2024-03-01")
                    .tag("culture"),
            )
            .await
            .unwrap();

        let score = coordinator.ledger().read("C").await.unwrap();
        assert_eq!(score.last_updated.as_deref(), Some("2024-03-01"));
    }

    #[tokio::test]
    async fn test_city_locks_grow_with_distinct_cities_only() {
        let coordinator = coordinator();
        for city in ["Lyon", "Lyon", "Nice", "Lyon"] {
            coordinator
                .ingest(NewsDraft::new("Local").located(city, "France"))
                .await
                .unwrap();
        }
        coordinator.ingest(NewsDraft::new("Nowhere")).await.unwrap();

        assert_eq!(coordinator.city_locks.len(), 2);
    }
}
