//! Aggregation of news events into city scores.

pub mod coordinator;

pub use coordinator::{AggregationCoordinator, IngestReport, ScoringOutcome};
