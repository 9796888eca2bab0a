//! Sample events ingested at startup when `storage.seed_demo_data` is set.

use chrono::{Duration, SecondsFormat, Utc};
use tracing::info;

use crate::error::Result;
use crate::events::NewsDraft;
use crate::service::NewsService;

/// The sample events, oldest offsets relative to now.
pub fn demo_drafts() -> Vec<NewsDraft> {
    let now = Utc::now();
    let at = |hours_ago: i64| (now - Duration::hours(hours_ago)).to_rfc3339_opts(SecondsFormat::Secs, true);

    vec![
        NewsDraft::new("Tech Boom in Berlin")
            .source("TechDaily")
            .located("Berlin", "Germany")
            .dated(at(0))
            .tags(["Tech", "Economy"]),
        NewsDraft::new("New Startup Hub in Paris")
            .source("LeMonde")
            .located("Paris", "France")
            .dated(at(24))
            .tags(["Startup", "Business"]),
        NewsDraft::new("Another Tech Event")
            .source("TechDaily")
            .located("Berlin", "Germany")
            .dated(at(48))
            .tag("Tech"),
        NewsDraft::new("AI Conference 2026")
            .source("AI News")
            .located("San Francisco", "USA")
            .dated(at(0))
            .tags(["AI", "Tech"]),
    ]
}

/// Ingest the sample events.
pub async fn seed_demo_data(service: &NewsService) -> Result<usize> {
    let drafts = demo_drafts();
    let count = drafts.len();
    for draft in drafts {
        service.ingest(draft).await?;
    }
    info!(count, "Seeded demo events");
    Ok(count)
}
