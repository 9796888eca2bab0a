//! Redis backend tests.
//!
//! These need a live server and are ignored by default:
//!
//! ```text
//! MI8_TEST_REDIS_URL=redis://127.0.0.1:6379 cargo test --test redis_backend_tests -- --ignored
//! ```
//!
//! Each test writes under its own random key prefix. The timeout tests run
//! against a local stub server and need no Redis.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use mi8_core::config::RedisConfig;
use mi8_core::error::ErrorCode;
use mi8_core::events::{NewsDraft, NewsEvent};
use mi8_core::service::NewsService;
use mi8_core::storage::{RedisBackend, StorageBackend};

async fn backend() -> Arc<RedisBackend> {
    let url = std::env::var("MI8_TEST_REDIS_URL")
        .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let config = RedisConfig {
        url,
        key_prefix: format!("mi8-test:{}:", uuid::Uuid::new_v4()),
        ..Default::default()
    };
    Arc::new(RedisBackend::connect(&config).await.unwrap())
}

#[tokio::test]
#[ignore]
async fn test_redis_scenarios() {
    let service = NewsService::new(backend().await);

    service
        .ingest(NewsDraft::new("a").located("X", "Xland").tag("crisis"))
        .await
        .unwrap();
    let score = service.score_of("X").await.unwrap();
    assert_eq!(
        (score.safety, score.economy, score.quality_of_life, score.culture),
        (920, 900, 940, 970)
    );
    assert_eq!(score.country.as_deref(), Some("Xland"));

    service
        .ingest(NewsDraft::new("b").located("A", "").tag("innovation"))
        .await
        .unwrap();
    let top = service.top_cities(1).await.unwrap();
    assert_eq!(top[0].city, "A");
    assert_eq!(top[0].total_score, 4115.0);

    assert_eq!(service.score_of("Nowhere").await.unwrap_err().code(), ErrorCode::NotFound);
}

#[tokio::test]
#[ignore]
async fn test_redis_event_indices() {
    let service = NewsService::new(backend().await);
    for (name, city) in [("n0", "Rome"), ("n1", ""), ("n2", "ROME")] {
        service
            .ingest(NewsDraft::new(name).located(city, ""))
            .await
            .unwrap();
    }

    let global = service.latest_global(10).await.unwrap();
    let names: Vec<_> = global.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["n2", "n1", "n0"]);

    let rome = service.latest_for_city("rome", 10).await.unwrap();
    assert_eq!(rome.len(), 2);
    assert_eq!(rome[0].name, "n2");
}

#[tokio::test]
#[ignore]
async fn test_redis_clamping_keeps_signed_accumulator() {
    let backend = backend().await;
    let service = NewsService::new(backend.clone());
    for _ in 0..9 {
        service
            .ingest(NewsDraft::new("c").located("Metro", "").tag("crime"))
            .await
            .unwrap();
    }

    assert_eq!(service.score_of("Metro").await.unwrap().safety, 0);
    let record = backend.read_ledger("Metro").await.unwrap().unwrap();
    assert_eq!(record.accumulators[0], -80);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn test_redis_concurrent_increments() {
    let backend = backend().await;
    let service = NewsService::new(backend.clone());

    let tasks: Vec<_> = (0..40)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .ingest(NewsDraft::new("i").located("Hub", "").tag("innovation"))
                    .await
            })
        })
        .collect();
    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let record = backend.read_ledger("Hub").await.unwrap().unwrap();
    assert_eq!(record.accumulators, [1800, 3400, 2200, 1200]);
}

#[tokio::test]
async fn test_unreachable_redis_is_storage_unavailable() {
    let config = RedisConfig {
        url: "redis://127.0.0.1:1".to_string(),
        connect_timeout: Duration::from_millis(500),
        ..Default::default()
    };

    let err = match RedisBackend::connect(&config).await {
        Ok(_) => panic!("connected to a closed port"),
        Err(e) => e,
    };
    assert_eq!(err.code(), ErrorCode::StorageUnavailable);
}

// ============================================================================
// Command Timeout Tests
// ============================================================================

/// Read one RESP array command, `None` once the client hangs up.
async fn read_command<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<Option<Vec<String>>> {
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    let count: usize = line.trim_end().trim_start_matches('*').parse().unwrap_or(0);

    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        line.clear();
        reader.read_line(&mut line).await?;
        let len: usize = line.trim_end().trim_start_matches('$').parse().unwrap_or(0);
        let mut buf = vec![0; len + 2];
        reader.read_exact(&mut buf).await?;
        buf.truncate(len);
        args.push(String::from_utf8_lossy(&buf).into_owned());
    }
    Ok(Some(args))
}

/// A server that completes the connection handshake and answers the first
/// `PING`, then reads every later command without replying.
async fn stalling_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let (reader, mut writer) = socket.into_split();
                let mut reader = BufReader::new(reader);
                let mut stalled = false;

                while let Ok(Some(command)) = read_command(&mut reader).await {
                    if stalled {
                        continue;
                    }
                    let is_ping = command
                        .first()
                        .is_some_and(|name| name.eq_ignore_ascii_case("PING"));
                    let reply: &[u8] = if is_ping { b"+PONG\r\n" } else { b"+OK\r\n" };
                    if writer.write_all(reply).await.is_err() {
                        break;
                    }
                    stalled = is_ping;
                }
            });
        }
    });

    format!("redis://{}", addr)
}

#[tokio::test]
async fn test_stalled_command_is_storage_unavailable() {
    let config = RedisConfig {
        url: stalling_server().await,
        connect_timeout: Duration::from_secs(2),
        command_timeout: Duration::from_millis(50),
        ..Default::default()
    };
    let backend = RedisBackend::connect(&config).await.unwrap();

    let err = backend.read_ledger("Berlin").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::StorageUnavailable);

    let event = NewsEvent::from_draft(
        NewsDraft::new("Stalled").located("Berlin", "Germany"),
        chrono::Utc::now(),
    );
    let err = backend.append_event(event).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::StorageUnavailable);

    let err = backend.top_ranked(5).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::StorageUnavailable);
}
