//! Tag impact table.
//!
//! A static mapping from a news tag to the score deltas it causes. Matching is
//! case-insensitive and exact; tags outside the table contribute nothing.

use std::collections::HashMap;
use std::sync::OnceLock;

use super::ImpactVector;

/// Global impact table, built on first use and never mutated afterwards.
static IMPACT_TABLE: OnceLock<ImpactTable> = OnceLock::new();

const ENTRIES: [(&str, ImpactVector); 7] = [
    ("innovation", ImpactVector::new(20, 60, 30, 5)),
    ("culture", ImpactVector::new(0, 15, 40, 75)),
    ("healthcare", ImpactVector::new(30, 20, 30, 0)),
    ("entertainment", ImpactVector::new(0, 20, 25, 35)),
    ("crisis", ImpactVector::new(-80, -100, -60, -30)),
    ("crime", ImpactVector::new(-120, -50, -80, -40)),
    ("disaster", ImpactVector::new(-100, -70, -90, -30)),
];

/// Immutable lookup from normalized tag to impact vector.
#[derive(Debug)]
pub struct ImpactTable {
    vectors: HashMap<&'static str, ImpactVector>,
}

impl ImpactTable {
    /// Get the process-wide table.
    pub fn global() -> &'static ImpactTable {
        IMPACT_TABLE.get_or_init(|| ImpactTable {
            vectors: ENTRIES.into_iter().collect(),
        })
    }

    /// Look up a single tag. Unknown tags yield `None`.
    pub fn get(&self, tag: &str) -> Option<ImpactVector> {
        self.vectors.get(tag.to_lowercase().as_str()).copied()
    }

    /// Tags the table recognises, sorted.
    pub fn known_tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<_> = self.vectors.keys().copied().collect();
        tags.sort_unstable();
        tags
    }

    /// Elementwise sum of the vectors of every recognised tag.
    ///
    /// Each occurrence counts, so a tag listed twice applies twice.
    pub fn impact_of<S: AsRef<str>>(&self, tags: &[S]) -> ImpactVector {
        tags.iter()
            .filter_map(|tag| self.get(tag.as_ref()))
            .fold(ImpactVector::ZERO, |acc, v| acc + v)
    }
}

/// Impact of a full tag set against the global table.
pub fn impact_of<S: AsRef<str>>(tags: &[S]) -> ImpactVector {
    ImpactTable::global().impact_of(tags)
}
