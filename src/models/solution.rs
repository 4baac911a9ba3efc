//! Solution model.
//!
//! A `Solution` is the immutable result of one solve run: the assignment
//! itself, the realized dissatisfaction statistics, and how the result was
//! obtained (method, optimality certificate, reported objective). Solutions
//! are strictly ordered so that candidate results can be compared: lower
//! mean dissatisfaction wins, then lower variance, then the lexicographic
//! tie-break key derived from the seeded permutations.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::SolveMethod;

/// A student who could strictly improve by moving to free capacity.
///
/// Produced by the stability diagnostics; a stable assignment has none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockingPair {
    pub student: String,
    pub assigned: String,
    pub preferred: String,
}

impl fmt::Display for BlockingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "student {:?} is assigned {:?} but prefers {:?}, which has free capacity",
            self.student, self.assigned, self.preferred
        )
    }
}

/// An immutable assignment with its statistics and provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Student id → assigned project id.
    pub(crate) assignment: BTreeMap<String, String>,
    /// Student id → realized dissatisfaction.
    pub(crate) scores: BTreeMap<String, f64>,
    /// Project id → owning supervisor id (owned projects only).
    pub(crate) supervisor_of: BTreeMap<String, String>,
    /// Strategy that produced the assignment.
    pub(crate) method: SolveMethod,
    /// Whether the result is certified cost-optimal.
    pub(crate) optimal: bool,
    /// Objective value reported by the strategy (unperturbed cost sum).
    pub(crate) objective: f64,
    /// Assigned projects' tie-break indices in student tie-break order.
    pub(crate) tie_break_key: Vec<usize>,
    /// Stability diagnostics computed against the full problem.
    pub(crate) blocking_pairs: Vec<BlockingPair>,
}

impl Solution {
    /// The project assigned to a student.
    pub fn project_for(&self, student: &str) -> Option<&str> {
        self.assignment.get(student).map(String::as_str)
    }

    /// The full student → project map, in canonical student order.
    pub fn assignment(&self) -> &BTreeMap<String, String> {
        &self.assignment
    }

    /// Students assigned to a project (one per slot), canonical order.
    pub fn students_for_project(&self, project: &str) -> Vec<&str> {
        self.assignment
            .iter()
            .filter(|(_, p)| p.as_str() == project)
            .map(|(s, _)| s.as_str())
            .collect()
    }

    /// How many assigned students a supervisor currently carries.
    pub fn assigned_count_for_supervisor(&self, supervisor: &str) -> usize {
        self.assignment
            .values()
            .filter(|p| self.supervisor_of.get(*p).map(String::as_str) == Some(supervisor))
            .count()
    }

    /// Realized dissatisfaction for a student.
    pub fn score_for(&self, student: &str) -> Option<f64> {
        self.scores.get(student).copied()
    }

    /// Number of assigned students.
    pub fn n_students(&self) -> usize {
        self.assignment.len()
    }

    /// Strategy that produced this assignment.
    pub fn method(&self) -> SolveMethod {
        self.method
    }

    /// Whether the result is certified cost-optimal.
    pub fn is_optimal(&self) -> bool {
        self.optimal
    }

    /// Objective value reported by the strategy.
    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// Mean realized dissatisfaction.
    pub fn mean_dissatisfaction(&self) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        self.scores.values().sum::<f64>() / self.scores.len() as f64
    }

    /// Population variance of realized dissatisfaction.
    pub fn variance(&self) -> f64 {
        let n = self.scores.len();
        if n == 0 {
            return 0.0;
        }
        let mean = self.mean_dissatisfaction();
        self.scores.values().map(|s| (s - mean).powi(2)).sum::<f64>() / n as f64
    }

    /// Median realized dissatisfaction.
    pub fn median_dissatisfaction(&self) -> f64 {
        let mut sorted: Vec<f64> = self.scores.values().copied().collect();
        if sorted.is_empty() {
            return 0.0;
        }
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 1 {
            sorted[mid]
        } else {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        }
    }

    /// Smallest realized dissatisfaction.
    pub fn min_dissatisfaction(&self) -> Option<f64> {
        self.scores.values().copied().min_by(f64::total_cmp)
    }

    /// Largest realized dissatisfaction.
    pub fn max_dissatisfaction(&self) -> Option<f64> {
        self.scores.values().copied().max_by(f64::total_cmp)
    }

    /// Whether no student can strictly improve by moving to free capacity.
    pub fn is_stable(&self) -> bool {
        self.blocking_pairs.is_empty()
    }

    /// Stability diagnostics: every student who could improve by moving
    /// to a project with free capacity, with their current and preferred
    /// projects.
    pub fn blocking_pairs(&self) -> &[BlockingPair] {
        &self.blocking_pairs
    }

    /// Strict preference order among candidate solutions.
    ///
    /// Lower mean, then lower variance, then the lexicographically
    /// smaller tie-break key. Total as long as both solutions were built
    /// from the same problem (equal-length keys, finite statistics).
    pub fn compare(&self, other: &Solution) -> Ordering {
        self.mean_dissatisfaction()
            .total_cmp(&other.mean_dissatisfaction())
            .then_with(|| self.variance().total_cmp(&other.variance()))
            .then_with(|| self.tie_break_key.cmp(&other.tie_break_key))
    }

    /// Whether this solution strictly beats another.
    pub fn is_better_than(&self, other: &Solution) -> bool {
        self.compare(other) == Ordering::Less
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn scores(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn sample(score_list: &[(&str, f64)], key: Vec<usize>) -> Solution {
        Solution {
            assignment: map(&[("s1", "p1"), ("s2", "p2"), ("s3", "p3")]),
            scores: scores(score_list),
            supervisor_of: map(&[("p1", "sup1"), ("p2", "sup1"), ("p3", "sup2")]),
            method: SolveMethod::Optimize,
            optimal: true,
            objective: score_list.iter().map(|(_, s)| s).sum(),
            tie_break_key: key,
            blocking_pairs: Vec::new(),
        }
    }

    #[test]
    fn test_statistics() {
        let sol = sample(&[("s1", 1.0), ("s2", 2.0), ("s3", 6.0)], vec![0, 1, 2]);
        assert!((sol.mean_dissatisfaction() - 3.0).abs() < 1e-12);
        // Population variance of [1, 2, 6] around 3: (4 + 1 + 9) / 3.
        assert!((sol.variance() - 14.0 / 3.0).abs() < 1e-12);
        assert_eq!(sol.median_dissatisfaction(), 2.0);
        assert_eq!(sol.min_dissatisfaction(), Some(1.0));
        assert_eq!(sol.max_dissatisfaction(), Some(6.0));
    }

    #[test]
    fn test_even_count_median() {
        let mut sol = sample(&[("s1", 1.0), ("s2", 3.0)], vec![0, 1]);
        sol.assignment = map(&[("s1", "p1"), ("s2", "p2")]);
        assert_eq!(sol.median_dissatisfaction(), 2.0);
    }

    #[test]
    fn test_rosters() {
        let sol = sample(&[("s1", 1.0), ("s2", 2.0), ("s3", 3.0)], vec![0, 1, 2]);
        assert_eq!(sol.students_for_project("p2"), vec!["s2"]);
        assert_eq!(sol.assigned_count_for_supervisor("sup1"), 2);
        assert_eq!(sol.assigned_count_for_supervisor("sup2"), 1);
        assert_eq!(sol.assigned_count_for_supervisor("nobody"), 0);
        assert_eq!(sol.project_for("s3"), Some("p3"));
        assert_eq!(sol.project_for("ghost"), None);
    }

    #[test]
    fn test_ordering_by_mean_then_variance_then_key() {
        let low_mean = sample(&[("s1", 1.0), ("s2", 1.0), ("s3", 1.0)], vec![2, 1, 0]);
        let high_mean = sample(&[("s1", 2.0), ("s2", 2.0), ("s3", 2.0)], vec![0, 1, 2]);
        assert!(low_mean.is_better_than(&high_mean));

        // Same mean (2.0), different spread.
        let spread = sample(&[("s1", 1.0), ("s2", 2.0), ("s3", 3.0)], vec![0, 1, 2]);
        assert!(high_mean.is_better_than(&spread));

        // Same statistics, tie broken by key.
        let key_a = sample(&[("s1", 1.0), ("s2", 2.0), ("s3", 3.0)], vec![0, 1, 2]);
        let key_b = sample(&[("s1", 1.0), ("s2", 2.0), ("s3", 3.0)], vec![0, 2, 1]);
        assert!(key_a.is_better_than(&key_b));
        assert_eq!(key_a.compare(&key_a), Ordering::Equal);
    }

    #[test]
    fn test_stability_report() {
        let mut sol = sample(&[("s1", 2.0)], vec![0]);
        assert!(sol.is_stable());

        sol.blocking_pairs.push(BlockingPair {
            student: "s1".into(),
            assigned: "p1".into(),
            preferred: "p2".into(),
        });
        assert!(!sol.is_stable());
        let text = sol.blocking_pairs()[0].to_string();
        assert!(text.contains("s1") && text.contains("p2"));
    }
}
