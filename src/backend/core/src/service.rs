//! Boundary operations exposed to collaborators.
//!
//! Writes go through the [`AggregationCoordinator`]; reads go straight to the
//! event store, ledger or ranking index.

use std::sync::Arc;
use tracing::warn;

use crate::aggregation::{AggregationCoordinator, IngestReport};
use crate::error::Result;
use crate::events::{NewsDraft, NewsEvent};
use crate::ledger::CityScore;
use crate::ranking::RankedCity;
use crate::storage::StorageBackend;

/// Facade over the scoring engine.
#[derive(Clone)]
pub struct NewsService {
    coordinator: Arc<AggregationCoordinator>,
    backend: Arc<dyn StorageBackend>,
}

impl NewsService {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            coordinator: Arc::new(AggregationCoordinator::new(backend.clone())),
            backend,
        }
    }

    pub fn coordinator(&self) -> &AggregationCoordinator {
        &self.coordinator
    }

    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    /// Store an event and update its city's scores.
    pub async fn ingest(&self, draft: NewsDraft) -> Result<NewsEvent> {
        self.ingest_with_report(draft).await.map(|report| report.event)
    }

    /// Like [`ingest`](Self::ingest), also reporting how scoring went.
    pub async fn ingest_with_report(&self, draft: NewsDraft) -> Result<IngestReport> {
        self.coordinator.ingest(draft).await
    }

    pub async fn latest_global(&self, limit: usize) -> Result<Vec<NewsEvent>> {
        self.coordinator.events().list_latest_global(limit).await
    }

    pub async fn latest_for_city(&self, city: &str, limit: usize) -> Result<Vec<NewsEvent>> {
        self.coordinator.events().list_latest_for_entity(city, limit).await
    }

    pub async fn score_of(&self, city: &str) -> Result<CityScore> {
        self.coordinator.ledger().read(city.trim()).await
    }

    pub async fn top_cities(&self, limit: usize) -> Result<Vec<RankedCity>> {
        self.coordinator.ranking().top_n(limit).await
    }

    /// Score cards for the top-ranked cities, in rank order.
    ///
    /// Cities whose ledger cannot be read are left out.
    pub async fn top_city_scores(&self, limit: usize) -> Result<Vec<CityScore>> {
        let ranked = self.top_cities(limit).await?;
        let mut scores = Vec::with_capacity(ranked.len());
        for entry in ranked {
            match self.coordinator.ledger().read(&entry.city).await {
                Ok(score) => scores.push(score),
                Err(e) => warn!(city = %entry.city, error = %e, "Skipping unreadable city score"),
            }
        }
        Ok(scores)
    }

    /// Check the storage backend is reachable.
    pub async fn ping(&self) -> Result<()> {
        self.backend.ping().await
    }
}
