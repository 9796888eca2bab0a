//! News event records.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Event IDs
// =============================================================================

/// Unique identifier for a stored news event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Drafts and Records
// =============================================================================

/// A news event as submitted by a caller, before identity is assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsDraft {
    pub name: String,

    #[serde(default)]
    pub source: String,

    /// City the event is about; empty when it concerns no particular city
    #[serde(default)]
    pub city: String,

    #[serde(default)]
    pub country: String,

    /// Event date as supplied; defaults to the ingestion time
    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewsDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn located(mut self, city: impl Into<String>, country: impl Into<String>) -> Self {
        self.city = city.into();
        self.country = country.into();
        self
    }

    pub fn dated(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

/// A stored news event. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsEvent {
    pub id: EventId,

    /// Position in the global append order, assigned by the storage backend
    #[serde(default)]
    pub sequence: u64,

    pub name: String,
    pub source: String,
    pub city: String,
    pub country: String,
    pub date: String,
    pub tags: Vec<String>,
    pub ingested_at: DateTime<Utc>,
}

impl NewsEvent {
    /// Stamp a draft with a fresh identity and ingestion time.
    pub fn from_draft(draft: NewsDraft, ingested_at: DateTime<Utc>) -> Self {
        let date = draft
            .date
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| ingested_at.to_rfc3339_opts(SecondsFormat::Secs, true));

        Self {
            id: EventId::new(),
            sequence: 0,
            name: draft.name,
            source: draft.source,
            city: draft.city.trim().to_string(),
            country: draft.country.trim().to_string(),
            date,
            tags: draft.tags,
            ingested_at,
        }
    }

    /// The city this event scores against, if any.
    pub fn city_key(&self) -> Option<&str> {
        if self.city.is_empty() {
            None
        } else {
            Some(&self.city)
        }
    }
}

/// Case-folded form of a city name used for per-city event indices.
pub fn fold_city(city: &str) -> String {
    city.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_draft_assigns_identity_and_defaults_date() {
        let now = Utc::now();
        let a = NewsEvent::from_draft(NewsDraft::new("a"), now);
        let b = NewsEvent::from_draft(NewsDraft::new("a"), now);

        assert_ne!(a.id, b.id);
        assert_eq!(a.date, now.to_rfc3339_opts(SecondsFormat::Secs, true));
        assert_eq!(a.city_key(), None);
    }

    #[test]
    fn test_from_draft_keeps_supplied_date() {
        let draft = NewsDraft::new("Flood")
            .located("  Prague ", "Czechia")
            .dated("2024-05-01T10:00:00Z")
            .tags(["disaster", "Weather"]);
        let event = NewsEvent::from_draft(draft, Utc::now());

        assert_eq!(event.date, "2024-05-01T10:00:00Z");
        assert_eq!(event.city_key(), Some("Prague"));
        assert_eq!(event.tags, vec!["disaster", "Weather"]);
    }

    #[test]
    fn test_blank_city_has_no_key() {
        let event = NewsEvent::from_draft(NewsDraft::new("x").located("   ", "Nowhere"), Utc::now());
        assert_eq!(event.city_key(), None);
    }

    #[test]
    fn test_draft_deserializes_with_defaults() {
        let draft: NewsDraft = serde_json::from_str(r#"{"name":"Only name"}"#).unwrap();
        assert_eq!(draft, NewsDraft::new("Only name"));
    }

    #[test]
    fn test_fold_city() {
        assert_eq!(fold_city(" San Francisco "), "san francisco");
    }
}
