//! Per-city score ledger.
//!
//! Each city owns four signed accumulators that start at
//! [`BASELINE_SCORE`](crate::scoring::BASELINE_SCORE) on its first event.
//! Accumulators keep their signed value across updates and are floored to zero
//! only when read, so a city that sank to -50 and then gained +80 reads 30.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::{Mi8Error, Result};
use crate::scoring::{Dimension, ImpactVector, BASELINE_SCORE};
use crate::storage::{LedgerRecord, StorageBackend};

/// Clamped view of a city's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityScore {
    pub city: String,
    pub country: Option<String>,
    pub safety: u64,
    pub economy: u64,
    pub quality_of_life: u64,
    pub culture: u64,
    pub last_updated: Option<String>,
}

impl CityScore {
    fn from_record(city: &str, record: LedgerRecord) -> Self {
        let clamped = |dimension: Dimension| clamp(record.accumulators[dimension.index()]);
        Self {
            city: city.to_string(),
            safety: clamped(Dimension::Safety),
            economy: clamped(Dimension::Economy),
            quality_of_life: clamped(Dimension::QualityOfLife),
            culture: clamped(Dimension::Culture),
            country: record.country,
            last_updated: record.last_updated,
        }
    }

    /// Clamped value for one dimension.
    pub fn get(&self, dimension: Dimension) -> u64 {
        match dimension {
            Dimension::Safety => self.safety,
            Dimension::Economy => self.economy,
            Dimension::QualityOfLife => self.quality_of_life,
            Dimension::Culture => self.culture,
        }
    }

    /// Sum of the clamped dimensions.
    pub fn total(&self) -> u64 {
        self.safety + self.economy + self.quality_of_life + self.culture
    }
}

/// Floor a signed accumulator at zero.
pub fn clamp(value: i64) -> u64 {
    value.max(0) as u64
}

/// Score ledger over the shared storage backend.
#[derive(Clone)]
pub struct ScoreLedger {
    backend: Arc<dyn StorageBackend>,
    baseline: i64,
}

impl ScoreLedger {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::with_baseline(backend, BASELINE_SCORE)
    }

    pub fn with_baseline(backend: Arc<dyn StorageBackend>, baseline: i64) -> Self {
        Self { backend, baseline }
    }

    pub fn baseline(&self) -> i64 {
        self.baseline
    }

    /// Create the city's entry at the baseline if absent and record `country`
    /// unless one is already recorded.
    pub async fn ensure_initialized(&self, city: &str, country: &str) -> Result<()> {
        self.backend.init_ledger(city, country.trim(), self.baseline).await
    }

    /// Add `delta` to the city's accumulators. Atomic per city.
    #[instrument(skip(self, delta), fields(delta = ?delta.0))]
    pub async fn apply_delta(&self, city: &str, delta: &ImpactVector, timestamp: &str) -> Result<()> {
        self.backend.increment_ledger(city, delta, timestamp).await?;
        debug!("Ledger updated");
        Ok(())
    }

    /// Clamped scores for a city, `NotFound` if it was never scored.
    pub async fn read(&self, city: &str) -> Result<CityScore> {
        self.backend
            .read_ledger(city)
            .await?
            .map(|record| CityScore::from_record(city, record))
            .ok_or_else(|| Mi8Error::not_found("City", city))
    }
}
