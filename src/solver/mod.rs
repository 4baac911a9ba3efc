//! Solving strategies.
//!
//! Strategies work on a preprocessed [`Instance`]: canonical indices,
//! a dense cost table, the resolved eligibility matrix, and the seeded
//! tie-break permutations. They return a raw [`Outcome`] (one project
//! index per student); the problem layer wraps it into a `Solution`.
//!
//! - [`flow`] — augmenting-path maximum flow: feasibility oracle and
//!   incumbent generator.
//! - [`mip`] — exact cost minimization via an integer-programming engine
//!   under a wall-clock budget.
//! - [`matching`] — deterministic many-to-one stable matching.

pub(crate) mod flow;
pub(crate) mod matching;
pub(crate) mod mip;

use thiserror::Error;

use crate::eligibility::EligibilityMatrix;

/// A solve that cannot produce an assignment.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    /// No assignment covers every student; names those left uncovered by
    /// a maximum matching.
    #[error("no feasible assignment: students {students:?} cannot all be placed")]
    Infeasible { students: Vec<String> },
    /// The optimization engine malfunctioned.
    #[error("optimization engine unavailable: {0}")]
    Unavailable(String),
}

/// Preprocessed problem data shared by every strategy.
pub(crate) struct Instance<'a> {
    /// Canonical student ids, for error messages.
    pub student_ids: &'a [String],
    /// Dissatisfaction of student `s` with project `p`: `cost[s][p]`.
    pub cost: &'a [Vec<f64>],
    /// Hard (student, project) compatibility.
    pub eligibility: &'a EligibilityMatrix,
    /// Project index → supervisor index, if owned.
    pub supervisor_of: &'a [Option<usize>],
    /// Supervisor index → student capacity.
    pub capacity: &'a [usize],
    /// Tie-break position of each student (0 = first dictator).
    pub student_rank: &'a [usize],
    /// Tie-break position of each project (0 = preferred in ties).
    pub project_rank: &'a [usize],
}

impl Instance<'_> {
    pub fn n_students(&self) -> usize {
        self.cost.len()
    }

    pub fn n_projects(&self) -> usize {
        self.supervisor_of.len()
    }

    pub fn n_supervisors(&self) -> usize {
        self.capacity.len()
    }

    /// Students in tie-break order.
    pub fn students_by_rank(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.n_students()).collect();
        order.sort_by_key(|&s| self.student_rank[s]);
        order
    }

    /// Unperturbed cost sum of an assignment.
    pub fn assignment_cost(&self, assignment: &[usize]) -> f64 {
        assignment
            .iter()
            .enumerate()
            .map(|(s, &p)| self.cost[s][p])
            .sum()
    }
}

/// Raw strategy result over canonical indices.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Outcome {
    /// Student index → assigned project index.
    pub assignment: Vec<usize>,
    /// Whether the result is certified cost-optimal.
    pub certified_optimal: bool,
    /// Unperturbed cost sum of the assignment.
    pub objective: f64,
}
