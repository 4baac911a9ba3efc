//! Solve configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::preferences::DEFAULT_PREFERENCE_POWER;
use crate::ranking::RankNotation;

/// Seed for the tie-break permutations when none is given.
pub const DEFAULT_SEED: u64 = 1234;

/// Wall-clock budget for the optimizing engine when none is given.
pub const DEFAULT_TIME_BUDGET: Duration = Duration::from_secs(60);

/// Weight of the second-moment (variance pressure) objective term.
pub const DEFAULT_VARIANCE_WEIGHT: f64 = 0.0;

/// Which solving strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveMethod {
    /// Exact cost minimization via the integer-programming engine.
    Optimize,
    /// Deterministic many-to-one stable matching.
    StableMatching,
    /// [`Optimize`](Self::Optimize), falling back to stable matching if
    /// the engine is unavailable.
    OptimizeThenFallback,
}

/// Accepted spellings, matched after trimming and lower-casing.
const METHOD_NAMES: &[(&str, SolveMethod)] = &[
    ("optimize", SolveMethod::Optimize),
    ("optimise", SolveMethod::Optimize),
    ("stable_matching", SolveMethod::StableMatching),
    ("stable", SolveMethod::StableMatching),
    ("optimize_then_fallback", SolveMethod::OptimizeThenFallback),
    ("fallback", SolveMethod::OptimizeThenFallback),
];

impl SolveMethod {
    /// Looks up a method by name, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase();
        METHOD_NAMES
            .iter()
            .find(|(n, _)| *n == normalized)
            .map(|(_, v)| *v)
    }
}

/// Everything a solve run can be tuned by.
///
/// Two runs over the same entities with equal configs produce the same
/// assignment, whatever order the entities arrived in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveConfig {
    /// Solving strategy.
    pub method: SolveMethod,
    /// Exponent applied to ranks when scoring (>= 1).
    pub preference_power: f64,
    /// Weight of the variance-pressure objective term (>= 0).
    pub variance_weight: f64,
    /// Notation the students' raw ranks are written in.
    pub rank_notation: RankNotation,
    /// Seed for the tie-break permutations.
    pub seed: u64,
    /// Wall-clock budget for the optimizing engine.
    pub time_budget: Duration,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            method: SolveMethod::OptimizeThenFallback,
            preference_power: DEFAULT_PREFERENCE_POWER,
            variance_weight: DEFAULT_VARIANCE_WEIGHT,
            rank_notation: RankNotation::Fractional,
            seed: DEFAULT_SEED,
            time_budget: DEFAULT_TIME_BUDGET,
        }
    }
}

impl SolveConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the solving strategy.
    pub fn with_method(mut self, method: SolveMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the preference power.
    pub fn with_preference_power(mut self, power: f64) -> Self {
        self.preference_power = power;
        self
    }

    /// Sets the variance-pressure weight.
    pub fn with_variance_weight(mut self, weight: f64) -> Self {
        self.variance_weight = weight;
        self
    }

    /// Sets the rank notation.
    pub fn with_rank_notation(mut self, notation: RankNotation) -> Self {
        self.rank_notation = notation;
        self
    }

    /// Sets the tie-break seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the engine time budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }
}
