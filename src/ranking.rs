//! Rank notation conversion.
//!
//! Preference ranks with ties can be written three ways (see
//! <https://en.wikipedia.org/wiki/Ranking>):
//!
//! | Notation | Two tied for first, one third |
//! |-------------|-------------------------------|
//! | Fractional  | 1.5, 1.5, 3 |
//! | Competition | 1, 1, 3 |
//! | Dense       | 1, 1, 2 |
//!
//! Fractional is the internal standard: tied items share the mean of the
//! positions they occupy, so a rank vector over n items always sums to
//! n(n+1)/2 regardless of ties. Conversion goes through fractional as the
//! intermediate form and is the identity for any A→B→A pair.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance for the fractional-sum integrity check.
const SUM_EPSILON: f64 = 1e-9;

/// How tied ranks are written in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankNotation {
    /// Tied items share the mean of the positions they occupy (1.5, 1.5, 3).
    Fractional,
    /// Tied items share the minimum position; gaps follow (1, 1, 3).
    Competition,
    /// Tied items share 1 + the number of strictly better groups (1, 1, 2).
    Dense,
}

/// Accepted spellings, matched after trimming and lower-casing.
const NOTATION_NAMES: &[(&str, RankNotation)] = &[
    ("fractional", RankNotation::Fractional),
    ("competition", RankNotation::Competition),
    ("standard", RankNotation::Competition),
    ("dense", RankNotation::Dense),
];

impl RankNotation {
    /// Looks up a notation by name, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase();
        NOTATION_NAMES
            .iter()
            .find(|(n, _)| *n == normalized)
            .map(|(_, v)| *v)
    }
}

impl std::str::FromStr for RankNotation {
    type Err = RankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| RankError::UnknownNotation(s.to_string()))
    }
}

/// A malformed rank sequence.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankError {
    #[error("rank {value} is not positive")]
    NonPositive { value: f64 },
    #[error("rank {value} out of range [1, {max}] for {notation:?} notation")]
    OutOfRange { value: f64, max: usize, notation: RankNotation },
    #[error("rank {value} must be an integer in {notation:?} notation")]
    NotInteger { value: f64, notation: RankNotation },
    #[error(
        "ranks {ranks:?} in {notation:?} notation are inconsistent: \
         as fractional ranks they sum to {sum}, expected {expected}"
    )]
    BadSum {
        ranks: Vec<f64>,
        notation: RankNotation,
        sum: f64,
        expected: f64,
    },
    #[error("unknown rank notation {0:?}")]
    UnknownNotation(String),
}

/// Converts a rank sequence from one notation to another.
///
/// The sequence is grouped by equality: every occurrence of the same value
/// belongs to one tie group. Conversion does not depend on element order.
pub fn convert_ranks(
    ranks: &[f64],
    src: RankNotation,
    dst: RankNotation,
) -> Result<Vec<f64>, RankError> {
    for &r in ranks {
        if !(r > 0.0) {
            return Err(RankError::NonPositive { value: r });
        }
    }
    let n = ranks.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    let fractional = to_fractional(ranks, src)?;

    // Integrity: fractional ranks over n items always sum to n(n+1)/2.
    let expected = (n * (n + 1)) as f64 / 2.0;
    let sum: f64 = fractional.iter().sum();
    if (sum - expected).abs() > SUM_EPSILON {
        return Err(RankError::BadSum {
            ranks: ranks.to_vec(),
            notation: src,
            sum,
            expected,
        });
    }

    Ok(from_fractional(&fractional, dst))
}

fn to_fractional(ranks: &[f64], src: RankNotation) -> Result<Vec<f64>, RankError> {
    let n = ranks.len();
    match src {
        RankNotation::Fractional => Ok(ranks.to_vec()),
        RankNotation::Competition => {
            // 1, 1, 3, 3, 5 → 1.5, 1.5, 3.5, 3.5, 5. A group of c items at
            // position x occupies positions x..x+c, mean x + (c-1)/2.
            let mut out = Vec::with_capacity(n);
            for &x in ranks {
                require_integer(x, src)?;
                if x < 1.0 || x > n as f64 {
                    return Err(RankError::OutOfRange { value: x, max: n, notation: src });
                }
                let c = count_eq(ranks, x) as f64;
                out.push(x + (c - 1.0) / 2.0);
            }
            Ok(out)
        }
        RankNotation::Dense => {
            // 1, 1, 2, 2, 3 → 1.5, 1.5, 3.5, 3.5, 5. The group occupies
            // positions n_below+1 .. n_below+c.
            let distinct = count_distinct(ranks);
            let mut out = Vec::with_capacity(n);
            for &x in ranks {
                require_integer(x, src)?;
                if x < 1.0 || x > distinct as f64 {
                    return Err(RankError::OutOfRange { value: x, max: distinct, notation: src });
                }
                let c = count_eq(ranks, x) as f64;
                let below = count_lt(ranks, x) as f64;
                out.push(below + (c + 1.0) / 2.0);
            }
            Ok(out)
        }
    }
}

fn from_fractional(fractional: &[f64], dst: RankNotation) -> Vec<f64> {
    match dst {
        RankNotation::Fractional => fractional.to_vec(),
        RankNotation::Competition => fractional
            .iter()
            .map(|&x| {
                let c = count_eq(fractional, x) as f64;
                x - (c - 1.0) / 2.0
            })
            .collect(),
        RankNotation::Dense => fractional
            .iter()
            .map(|&x| {
                let distinct_below = fractional
                    .iter()
                    .filter(|&&v| v < x)
                    .fold(Vec::new(), |mut seen: Vec<f64>, &v| {
                        if !seen.contains(&v) {
                            seen.push(v);
                        }
                        seen
                    })
                    .len();
                (distinct_below + 1) as f64
            })
            .collect(),
    }
}

fn require_integer(x: f64, notation: RankNotation) -> Result<(), RankError> {
    if x.fract() != 0.0 {
        return Err(RankError::NotInteger { value: x, notation });
    }
    Ok(())
}

fn count_eq(ranks: &[f64], x: f64) -> usize {
    ranks.iter().filter(|&&v| v == x).count()
}

fn count_lt(ranks: &[f64], x: f64) -> usize {
    ranks.iter().filter(|&&v| v < x).count()
}

fn count_distinct(ranks: &[f64]) -> usize {
    let mut seen: Vec<f64> = Vec::new();
    for &v in ranks {
        if !seen.contains(&v) {
            seen.push(v);
        }
    }
    seen.len()
}
