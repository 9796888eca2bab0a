//! Key layout for key-value backends.
//!
//! ```text
//! {prefix}news:{id}           event record (JSON)
//! {prefix}news:seq            event sequence counter
//! {prefix}news:latest         global index, sorted by sequence
//! {prefix}news:city:{city}    per-city index, sorted by sequence (city case-folded)
//! {prefix}city:score:{city}   ledger hash
//! {prefix}cities:rank         ranking index, sorted by total score
//! ```

use crate::events::{fold_city, EventId};

/// Builds prefixed keys for every record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    prefix: String,
}

impl KeyLayout {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn event(&self, id: &EventId) -> String {
        format!("{}news:{}", self.prefix, id)
    }

    /// Event key from a raw id string, as stored in the indices.
    pub fn event_raw(&self, id: &str) -> String {
        format!("{}news:{}", self.prefix, id)
    }

    pub fn sequence(&self) -> String {
        format!("{}news:seq", self.prefix)
    }

    pub fn latest(&self) -> String {
        format!("{}news:latest", self.prefix)
    }

    pub fn city_events(&self, city: &str) -> String {
        format!("{}news:city:{}", self.prefix, fold_city(city))
    }

    pub fn ledger(&self, city: &str) -> String {
        format!("{}city:score:{}", self.prefix, city)
    }

    pub fn ranking(&self) -> String {
        format!("{}cities:rank", self.prefix)
    }
}

impl Default for KeyLayout {
    fn default() -> Self {
        Self::new("mi8:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_layout() {
        let keys = KeyLayout::new("t:");
        let id = EventId(Uuid::nil());

        assert_eq!(keys.event(&id), "t:news:00000000-0000-0000-0000-000000000000");
        assert_eq!(keys.event_raw("abc"), "t:news:abc");
        assert_eq!(keys.sequence(), "t:news:seq");
        assert_eq!(keys.latest(), "t:news:latest");
        assert_eq!(keys.ranking(), "t:cities:rank");
    }

    #[test]
    fn test_city_index_is_case_folded_but_ledger_is_not() {
        let keys = KeyLayout::default();
        assert_eq!(keys.city_events("Berlin"), keys.city_events("BERLIN"));
        assert_eq!(keys.city_events("Berlin"), "mi8:news:city:berlin");
        assert_eq!(keys.ledger("Berlin"), "mi8:city:score:Berlin");
    }
}
