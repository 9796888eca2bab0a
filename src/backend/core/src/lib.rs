#![allow(clippy::result_large_err)]
//! # MI8 Core
//!
//! Tag-driven city scoring and news ranking engine.
//!
//! ## Architecture
//!
//! - **Scoring**: Static tag impact table mapping tags to signed score deltas
//! - **Events**: Append-only news event store with global and per-city time indices
//! - **Ledger**: Per-city score accumulators, floored at zero when read
//! - **Ranking**: Cities ordered by total score
//! - **Aggregation**: Ingestion protocol tying the above together per city
//! - **Storage**: Pluggable in-memory and Redis backends behind one trait
//! - **API**: REST interface over the boundary operations
//! - **Telemetry**: Structured logging and Prometheus metrics

pub mod aggregation;
pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod ledger;
pub mod ranking;
pub mod scoring;
pub mod seed;
pub mod service;
pub mod storage;
pub mod telemetry;

pub use error::{ErrorCode, ErrorDetails, ErrorSeverity, Mi8Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::aggregation::{AggregationCoordinator, IngestReport, ScoringOutcome};
    pub use crate::error::{ErrorCode, ErrorDetails, ErrorSeverity, Mi8Error, Result};
    pub use crate::events::{EventId, EventStore, NewsDraft, NewsEvent};
    pub use crate::ledger::{CityScore, ScoreLedger};
    pub use crate::ranking::{RankedCity, RankingIndex};
    pub use crate::scoring::{impact_of, Dimension, ImpactTable, ImpactVector, BASELINE_SCORE};
    pub use crate::service::NewsService;
    pub use crate::storage::{InMemoryBackend, RedisBackend, StorageBackend};
}
