//! Append-only event store with global and per-city time indices.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::event::{NewsDraft, NewsEvent};
use crate::error::Result;
use crate::storage::StorageBackend;

/// Event store over the shared storage backend.
#[derive(Clone)]
pub struct EventStore {
    backend: Arc<dyn StorageBackend>,
}

impl EventStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Assign identity to a draft and append it.
    ///
    /// The record and its index entries become visible together; on a storage
    /// failure nothing is written.
    #[instrument(skip(self, draft), fields(name = %draft.name, city = %draft.city))]
    pub async fn append(&self, draft: NewsDraft) -> Result<NewsEvent> {
        let event = NewsEvent::from_draft(draft, Utc::now());
        let stored = self.backend.append_event(event).await?;
        debug!(event_id = %stored.id, sequence = stored.sequence, "Event stored");
        Ok(stored)
    }

    /// Newest events first, at most `limit`.
    pub async fn list_latest_global(&self, limit: usize) -> Result<Vec<NewsEvent>> {
        self.backend.latest_events(limit).await
    }

    /// Newest events for a city, matched case-insensitively.
    pub async fn list_latest_for_entity(&self, city: &str, limit: usize) -> Result<Vec<NewsEvent>> {
        if city.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.backend.latest_events_for_city(city, limit).await
    }
}
