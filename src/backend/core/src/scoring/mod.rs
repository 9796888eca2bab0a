//! Score dimensions and tag impact vectors.
//!
//! Every city is scored along four fixed dimensions. A news event moves those
//! scores by the sum of the impact vectors of its recognised tags.

pub mod impact;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

pub use impact::{impact_of, ImpactTable};

/// Value every dimension starts from on a city's first event.
pub const BASELINE_SCORE: i64 = 1000;

/// One of the four fixed score axes tracked per city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Safety,
    Economy,
    QualityOfLife,
    Culture,
}

impl Dimension {
    /// All dimensions in vector order.
    pub const ALL: [Dimension; 4] = [
        Dimension::Safety,
        Dimension::Economy,
        Dimension::QualityOfLife,
        Dimension::Culture,
    ];

    /// Field name used in persisted ledger records.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Safety => "safety",
            Self::Economy => "economy",
            Self::QualityOfLife => "qol",
            Self::Culture => "culture",
        }
    }

    /// Position of this dimension inside an [`ImpactVector`].
    pub const fn index(&self) -> usize {
        match self {
            Self::Safety => 0,
            Self::Economy => 1,
            Self::QualityOfLife => 2,
            Self::Culture => 3,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

/// Signed per-dimension deltas, in [`Dimension::ALL`] order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImpactVector(pub [i64; 4]);

impl ImpactVector {
    pub const ZERO: ImpactVector = ImpactVector([0; 4]);

    pub const fn new(safety: i64, economy: i64, quality_of_life: i64, culture: i64) -> Self {
        Self([safety, economy, quality_of_life, culture])
    }

    pub fn get(&self, dimension: Dimension) -> i64 {
        self.0[dimension.index()]
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|d| *d == 0)
    }

    /// Pairs of (dimension, delta) in vector order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, i64)> + '_ {
        Dimension::ALL.iter().map(move |d| (*d, self.get(*d)))
    }
}

impl Add for ImpactVector {
    type Output = ImpactVector;

    fn add(mut self, rhs: ImpactVector) -> ImpactVector {
        self += rhs;
        self
    }
}

impl AddAssign for ImpactVector {
    fn add_assign(&mut self, rhs: ImpactVector) {
        for (lhs, rhs) in self.0.iter_mut().zip(rhs.0) {
            *lhs += rhs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_addition_is_elementwise() {
        let a = ImpactVector::new(1, -2, 3, -4);
        let b = ImpactVector::new(10, 20, -30, 40);
        assert_eq!(a + b, ImpactVector::new(11, 18, -27, 36));
    }

    #[test]
    fn test_dimension_fields_match_vector_order() {
        let v = ImpactVector::new(1, 2, 3, 4);
        let collected: Vec<_> = v.iter().collect();
        assert_eq!(
            collected,
            vec![
                (Dimension::Safety, 1),
                (Dimension::Economy, 2),
                (Dimension::QualityOfLife, 3),
                (Dimension::Culture, 4),
            ]
        );
        assert_eq!(Dimension::QualityOfLife.field(), "qol");
    }
}
