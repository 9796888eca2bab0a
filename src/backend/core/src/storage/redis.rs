//! Redis storage backend.
//!
//! Hosts the persisted layout described in [`super::keys`]. A single
//! `ConnectionManager` is opened at startup and cloned per call; every command
//! is bounded by the configured command timeout and reports
//! `StorageUnavailable` when it expires.

use async_trait::async_trait;
use metrics::histogram;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisResult};
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use super::backend::{LedgerRecord, RankEntry, StorageBackend};
use super::keys::KeyLayout;
use crate::config::RedisConfig;
use crate::error::{ErrorCode, Mi8Error, Result};
use crate::events::NewsEvent;
use crate::scoring::{Dimension, ImpactVector};

const COUNTRY_FIELD: &str = "country";
const LAST_UPDATED_FIELD: &str = "last_updated";

/// Redis storage backend.
pub struct RedisBackend {
    conn: ConnectionManager,
    keys: KeyLayout,
    command_timeout: Duration,
}

impl RedisBackend {
    /// Connect to Redis and verify the connection with `PING`.
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str()).map_err(|e| {
            Mi8Error::with_internal(
                ErrorCode::InvalidConfiguration,
                "Invalid Redis URL",
                e.to_string(),
            )
        })?;

        let conn = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| {
                Mi8Error::storage_unavailable(format!(
                    "connecting to {} timed out after {:?}",
                    config.url, config.connect_timeout
                ))
            })??;

        let backend = Self {
            conn,
            keys: KeyLayout::new(config.key_prefix.clone()),
            command_timeout: config.command_timeout,
        };
        backend.ping().await?;

        info!(url = %config.url, prefix = %config.key_prefix, "Redis storage backend connected");
        Ok(backend)
    }

    /// Run one Redis round trip under the command timeout.
    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        let started = Instant::now();
        let outcome = tokio::time::timeout(self.command_timeout, fut).await;
        histogram!(
            "mi8_storage_operation_duration_seconds",
            "backend" => "redis",
            "operation" => operation
        )
        .record(started.elapsed().as_secs_f64());

        match outcome {
            Ok(result) => result.map_err(Mi8Error::from),
            Err(_) => Err(Mi8Error::storage_unavailable(format!(
                "{} timed out after {:?}",
                operation, self.command_timeout
            ))),
        }
    }

    async fn fetch_events(&self, ids: Vec<String>) -> Result<Vec<NewsEvent>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids.iter().map(|id| self.keys.event_raw(id)).collect();
        let mut conn = self.conn.clone();
        let payloads: Vec<Option<String>> = self.bounded("mget_events", conn.mget(keys)).await?;

        let events = payloads
            .into_iter()
            .zip(ids)
            .filter_map(|(payload, id)| {
                let payload = payload?;
                match serde_json::from_str::<NewsEvent>(&payload) {
                    Ok(event) => Some(event),
                    Err(e) => {
                        warn!(event_id = %id, error = %e, "Skipping unreadable event record");
                        None
                    }
                }
            })
            .collect();
        Ok(events)
    }

    async fn index_range(&self, operation: &'static str, key: String, limit: usize) -> Result<Vec<String>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let stop = isize::try_from(limit).unwrap_or(isize::MAX) - 1;
        let mut conn = self.conn.clone();
        self.bounded(operation, conn.zrevrange(key, 0, stop)).await
    }
}

fn parse_accumulator(city: &str, fields: &HashMap<String, String>, dimension: Dimension) -> Result<i64> {
    match fields.get(dimension.field()) {
        None => Ok(0),
        Some(raw) => raw.parse().map_err(|_| {
            Mi8Error::with_internal(
                ErrorCode::StorageError,
                "Corrupt ledger record",
                format!("{}: field {} holds {:?}", city, dimension.field(), raw),
            )
        }),
    }
}

#[async_trait]
impl StorageBackend for RedisBackend {
    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn append_event(&self, mut event: NewsEvent) -> Result<NewsEvent> {
        let mut conn = self.conn.clone();
        let sequence: u64 = self
            .bounded("next_sequence", conn.incr(self.keys.sequence(), 1u64))
            .await?;
        event.sequence = sequence;

        let payload = serde_json::to_string(&event)?;
        let member = event.id.to_string();
        let score = sequence as f64;

        let mut pipe = redis::pipe();
        pipe.atomic()
            .set(self.keys.event(&event.id), payload)
            .ignore()
            .zadd(self.keys.latest(), &member, score)
            .ignore();
        if let Some(city) = event.city_key() {
            pipe.zadd(self.keys.city_events(city), &member, score).ignore();
        }

        self.bounded("append_event", pipe.query_async::<_, ()>(&mut conn))
            .await?;

        debug!(sequence, "Appended event");
        Ok(event)
    }

    async fn latest_events(&self, limit: usize) -> Result<Vec<NewsEvent>> {
        let ids = self.index_range("latest_events", self.keys.latest(), limit).await?;
        self.fetch_events(ids).await
    }

    async fn latest_events_for_city(&self, city: &str, limit: usize) -> Result<Vec<NewsEvent>> {
        let ids = self
            .index_range("latest_city_events", self.keys.city_events(city), limit)
            .await?;
        self.fetch_events(ids).await
    }

    async fn init_ledger(&self, city: &str, country: &str, baseline: i64) -> Result<()> {
        let key = self.keys.ledger(city);
        let mut pipe = redis::pipe();
        pipe.atomic();
        for dimension in Dimension::ALL {
            pipe.hset_nx(&key, dimension.field(), baseline).ignore();
        }
        if !country.is_empty() {
            pipe.hset_nx(&key, COUNTRY_FIELD, country).ignore();
        }

        let mut conn = self.conn.clone();
        self.bounded("init_ledger", pipe.query_async::<_, ()>(&mut conn))
            .await
    }

    async fn increment_ledger(&self, city: &str, delta: &ImpactVector, updated_at: &str) -> Result<()> {
        let key = self.keys.ledger(city);
        let mut pipe = redis::pipe();
        pipe.atomic();
        for (dimension, d) in delta.iter() {
            pipe.hincr(&key, dimension.field(), d).ignore();
        }
        pipe.hset(&key, LAST_UPDATED_FIELD, updated_at).ignore();

        let mut conn = self.conn.clone();
        self.bounded("increment_ledger", pipe.query_async::<_, ()>(&mut conn))
            .await
    }

    async fn read_ledger(&self, city: &str) -> Result<Option<LedgerRecord>> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> = self
            .bounded("read_ledger", conn.hgetall(self.keys.ledger(city)))
            .await?;

        if fields.is_empty() {
            return Ok(None);
        }

        let mut accumulators = [0i64; 4];
        for dimension in Dimension::ALL {
            accumulators[dimension.index()] = parse_accumulator(city, &fields, dimension)?;
        }

        Ok(Some(LedgerRecord {
            country: fields.get(COUNTRY_FIELD).filter(|c| !c.is_empty()).cloned(),
            accumulators,
            last_updated: fields.get(LAST_UPDATED_FIELD).cloned(),
        }))
    }

    async fn upsert_rank(&self, city: &str, score: f64) -> Result<()> {
        let mut conn = self.conn.clone();
        self.bounded("upsert_rank", conn.zadd::<_, _, _, ()>(self.keys.ranking(), city, score))
            .await
    }

    async fn top_ranked(&self, limit: usize) -> Result<Vec<RankEntry>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let stop = isize::try_from(limit).unwrap_or(isize::MAX) - 1;
        let mut conn = self.conn.clone();
        let ranked: Vec<(String, f64)> = self
            .bounded("top_ranked", conn.zrevrange_withscores(self.keys.ranking(), 0, stop))
            .await?;

        Ok(ranked
            .into_iter()
            .map(|(city, score)| RankEntry { city, score })
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = self
            .bounded("ping", redis::cmd("PING").query_async(&mut conn))
            .await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_accumulator_missing_field_is_zero() {
        let f = fields(&[("safety", "-40")]);
        assert_eq!(parse_accumulator("X", &f, Dimension::Safety).unwrap(), -40);
        assert_eq!(parse_accumulator("X", &f, Dimension::Culture).unwrap(), 0);
    }

    #[test]
    fn test_parse_accumulator_rejects_garbage() {
        let f = fields(&[("economy", "lots")]);
        let err = parse_accumulator("X", &f, Dimension::Economy).unwrap_err();
        assert_eq!(err.code(), ErrorCode::StorageError);
    }
}
