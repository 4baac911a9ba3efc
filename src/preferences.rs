//! Preference and dissatisfaction model.
//!
//! A student's preferences are a partial ranking over project ids: rank 1
//! is the most preferred, higher ranks are worse, ties are permitted (in
//! any [`RankNotation`](crate::ranking::RankNotation)). Ranks double as
//! dissatisfaction scores: the score of being assigned a project is its
//! rank raised to the configured preference power.
//!
//! Unranked projects all share one "indifferent" score: the mean of the
//! ranking positions the student left unused. That value is strictly worse
//! than every expressed rank, so leaving a project unranked is never better
//! than ranking it last.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ranking::{convert_ranks, RankError, RankNotation};

/// Default exponent applied to ranks when scoring.
pub const DEFAULT_PREFERENCE_POWER: f64 = 1.0;

/// A single participant's preference table, normalized to fractional ranks.
///
/// Immutable once built. Build once per student during problem
/// construction; scoring is then a pure lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    n_options: usize,
    power: f64,
    /// Expressed ranks in fractional notation, keyed by option id.
    ranks: BTreeMap<String, f64>,
    /// Shared score for every option without an expressed rank.
    /// `None` when every option is ranked.
    unranked: Option<f64>,
}

/// A malformed preference table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreferenceError {
    #[error("option {0:?} ranked more than once")]
    DuplicateOption(String),
    #[error("rank {rank} for option {option:?} outside [1, {max}]")]
    RankOutOfRange { option: String, rank: f64, max: usize },
    #[error("preference power {0} must be >= 1")]
    BadPower(f64),
    #[error(transparent)]
    Rank(#[from] RankError),
}

impl Preferences {
    /// Builds a preference table from raw `(option id, rank)` pairs.
    ///
    /// Ranks are converted from `notation` to fractional form and
    /// validated: each must lie in `[1, n_options]`, no option may appear
    /// twice, and the expressed ranks must occupy the top positions (for k
    /// expressed ranks their fractional values must sum to k(k+1)/2 — you
    /// can only state your "top k" choices).
    pub fn build(
        n_options: usize,
        raw: &[(String, f64)],
        notation: RankNotation,
        power: f64,
    ) -> Result<Self, PreferenceError> {
        if power < 1.0 {
            return Err(PreferenceError::BadPower(power));
        }

        let raw_ranks: Vec<f64> = raw.iter().map(|(_, r)| *r).collect();
        let fractional = convert_ranks(&raw_ranks, notation, RankNotation::Fractional)?;

        let mut ranks = BTreeMap::new();
        for ((id, _), &rank) in raw.iter().zip(fractional.iter()) {
            if rank < 1.0 || rank > n_options as f64 {
                return Err(PreferenceError::RankOutOfRange {
                    option: id.clone(),
                    rank,
                    max: n_options,
                });
            }
            if ranks.insert(id.clone(), rank).is_some() {
                return Err(PreferenceError::DuplicateOption(id.clone()));
            }
        }

        // The conversion's sum check guarantees the expressed ranks occupy
        // the top k positions (they sum to k(k+1)/2), so the unranked fill
        // score below never undercuts an expressed rank.
        let k = ranks.len();
        let allocated: f64 = ranks.values().sum();

        let n_unranked = n_options - k;
        let unranked = if n_unranked > 0 {
            // Mean of the unused positions k+1 ..= n_options.
            let total = (n_options * (n_options + 1)) as f64 / 2.0;
            Some((total - allocated) / n_unranked as f64)
        } else {
            None
        };

        Ok(Self { n_options, power, ranks, unranked })
    }

    /// Number of options this table ranges over.
    pub fn n_options(&self) -> usize {
        self.n_options
    }

    /// The expressed fractional rank for an option, if any.
    pub fn rank(&self, option: &str) -> Option<f64> {
        self.ranks.get(option).copied()
    }

    /// Whether the option was explicitly ranked.
    pub fn is_ranked(&self, option: &str) -> bool {
        self.ranks.contains_key(option)
    }

    /// Ids of all explicitly ranked options.
    pub fn ranked_options(&self) -> impl Iterator<Item = &str> {
        self.ranks.keys().map(String::as_str)
    }

    /// The shared score for unranked options, if any option is unranked.
    pub fn unranked_score(&self) -> Option<f64> {
        self.unranked
    }

    /// Raw (pre-exponentiation) score for an option.
    pub fn score(&self, option: &str) -> f64 {
        self.rank(option)
            .or(self.unranked)
            // Unreachable for any real option id: if every option is
            // ranked, every real id has an entry.
            .unwrap_or(self.n_options as f64)
    }

    /// Dissatisfaction with being assigned this option: `score^power`.
    pub fn dissatisfaction(&self, option: &str) -> f64 {
        self.score(option).powf(self.power)
    }

    /// Whether the expressed ranks are strictly ordered (no ties).
    pub fn is_strict(&self) -> bool {
        let mut seen: Vec<f64> = Vec::new();
        for &r in self.ranks.values() {
            if seen.contains(&r) {
                return false;
            }
            seen.push(r);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, f64)]) -> Vec<(String, f64)> {
        raw.iter().map(|(id, r)| (id.to_string(), *r)).collect()
    }

    #[test]
    fn test_full_ranking() {
        let p = Preferences::build(
            3,
            &pairs(&[("a", 1.0), ("b", 2.0), ("c", 3.0)]),
            RankNotation::Fractional,
            1.0,
        )
        .unwrap();
        assert_eq!(p.score("a"), 1.0);
        assert_eq!(p.score("c"), 3.0);
        assert_eq!(p.unranked_score(), None);
        assert!(p.is_strict());
    }

    #[test]
    fn test_partial_ranking_fill_score() {
        // 5 options, top 2 ranked. Unused positions are 3, 4, 5; the
        // shared fill score is their mean, 4.
        let p = Preferences::build(
            5,
            &pairs(&[("a", 1.0), ("b", 2.0)]),
            RankNotation::Fractional,
            1.0,
        )
        .unwrap();
        assert_eq!(p.unranked_score(), Some(4.0));
        assert_eq!(p.score("z"), 4.0);
        assert!(p.unranked_score().unwrap() > p.score("b"));
    }

    #[test]
    fn test_empty_ranking_is_uniform() {
        let p = Preferences::build(4, &[], RankNotation::Fractional, 1.0).unwrap();
        // Mean of 1..=4.
        assert_eq!(p.score("anything"), 2.5);
        assert_eq!(p.unranked_score(), Some(2.5));
    }

    #[test]
    fn test_ties_via_competition_notation() {
        let p = Preferences::build(
            4,
            &pairs(&[("a", 1.0), ("b", 1.0), ("c", 3.0)]),
            RankNotation::Competition,
            1.0,
        )
        .unwrap();
        assert_eq!(p.score("a"), 1.5);
        assert_eq!(p.score("b"), 1.5);
        assert_eq!(p.score("c"), 3.0);
        // Position 4 left unused.
        assert_eq!(p.unranked_score(), Some(4.0));
        assert!(!p.is_strict());
    }

    #[test]
    fn test_preference_power() {
        let p = Preferences::build(
            3,
            &pairs(&[("a", 1.0), ("b", 2.0), ("c", 3.0)]),
            RankNotation::Fractional,
            2.0,
        )
        .unwrap();
        assert_eq!(p.dissatisfaction("a"), 1.0);
        assert_eq!(p.dissatisfaction("b"), 4.0);
        assert_eq!(p.dissatisfaction("c"), 9.0);
    }

    #[test]
    fn test_rejects_non_top_ranks() {
        // Only rank expressed is 2: expressed positions must start at 1,
        // which the fractional sum check catches.
        let err = Preferences::build(
            3,
            &pairs(&[("a", 2.0)]),
            RankNotation::Fractional,
            1.0,
        )
        .unwrap_err();
        assert!(matches!(err, PreferenceError::Rank(RankError::BadSum { .. })));
    }

    #[test]
    fn test_rejects_duplicate_option() {
        let err = Preferences::build(
            3,
            &pairs(&[("a", 1.0), ("a", 2.0)]),
            RankNotation::Fractional,
            1.0,
        )
        .unwrap_err();
        assert!(matches!(err, PreferenceError::DuplicateOption(_)));
    }

    #[test]
    fn test_rejects_rank_out_of_range() {
        let err = Preferences::build(
            2,
            &pairs(&[("a", 1.0), ("b", 2.0), ("c", 3.0)]),
            RankNotation::Fractional,
            1.0,
        )
        .unwrap_err();
        assert!(matches!(err, PreferenceError::RankOutOfRange { .. }));
    }

    #[test]
    fn test_rejects_bad_power() {
        let err = Preferences::build(2, &[], RankNotation::Fractional, 0.5).unwrap_err();
        assert!(matches!(err, PreferenceError::BadPower(_)));
    }

    #[test]
    fn test_rejects_zero_rank() {
        let err = Preferences::build(
            2,
            &pairs(&[("a", 0.0)]),
            RankNotation::Fractional,
            1.0,
        )
        .unwrap_err();
        assert!(matches!(err, PreferenceError::Rank(_)));
    }
}
