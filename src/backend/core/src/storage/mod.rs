//! Storage backends.
//!
//! This module provides the pluggable backing store:
//! - **InMemoryBackend**: process-local store for tests and single-instance runs
//! - **RedisBackend**: networked store on Redis hashes and sorted sets
//!
//! The backend is opened once at startup with [`connect`] and handed to every
//! component as an `Arc<dyn StorageBackend>`.

pub mod backend;
pub mod keys;
pub mod memory;
pub mod redis;

use std::sync::Arc;
use tracing::info;

pub use self::backend::{LedgerRecord, RankEntry, StorageBackend};
pub use self::keys::KeyLayout;
pub use self::memory::InMemoryBackend;
pub use self::redis::RedisBackend;

use crate::config::{Config, StorageKind};
use crate::error::Result;

/// Open the configured backend.
pub async fn connect(config: &Config) -> Result<Arc<dyn StorageBackend>> {
    let backend: Arc<dyn StorageBackend> = match config.storage.backend {
        StorageKind::Memory => Arc::new(InMemoryBackend::new()),
        StorageKind::Redis => Arc::new(RedisBackend::connect(&config.redis).await?),
    };

    info!(backend = backend.name(), "Storage backend ready");
    Ok(backend)
}
