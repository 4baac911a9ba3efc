//! Exact cost minimization via integer programming.
//!
//! One binary variable per eligible (student, project) pair; ineligible
//! pairs never enter the model. Constraints: each student takes exactly
//! one project, each project slot at most one student, each supervisor at
//! most their capacity. The objective is the dissatisfaction sum plus an
//! optional second-moment term approximating variance pressure.
//!
//! Ties among true optima are broken lexicographically, in two stages:
//! the first solve minimizes the cost objective alone, the second pins
//! the cost sum to that optimum and minimizes a tie-break objective
//! derived from the seeded permutations. The cost-optimal set is never
//! reordered, however small the gap between two achievable cost sums,
//! and among the optima the engine lands on the unique
//! serial-dictatorship choice.
//!
//! The engine runs on a worker thread under a wall-clock budget. It is
//! not interruptible: on expiry the thread is abandoned and the
//! feasibility incumbent is returned, flagged non-optimal.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use good_lp::{
    constraint, default_solver, variable, variables, Expression, Solution as LpSolution,
    SolverModel, Variable,
};
use tracing::{debug, warn};

use super::{flow, Instance, Outcome, SolveError};

/// Slack on the pinned cost sum in the tie-break stage. Absorbs the
/// engine's floating-point drift only; it must stay far below any gap
/// between achievable cost sums.
const STAGE_TOLERANCE: f64 = 1e-7;

pub(crate) fn solve(
    inst: &Instance<'_>,
    variance_weight: f64,
    budget: Duration,
) -> Result<Outcome, SolveError> {
    // Feasibility first: fail fast naming the uncovered students, and
    // keep the matching as the incumbent.
    let incumbent = flow::maximum_assignment(inst)?;

    if budget.is_zero() {
        debug!("zero time budget, returning the feasibility incumbent");
        return Ok(incumbent_outcome(inst, incumbent));
    }

    let spec = ModelSpec::build(inst, variance_weight);
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        // The receiver may be gone after a timeout.
        let _ = tx.send(spec.run());
    });

    match rx.recv_timeout(budget) {
        Ok(Ok(assignment)) => {
            let objective = inst.assignment_cost(&assignment);
            debug!(objective, "engine finished within budget");
            Ok(Outcome {
                assignment,
                certified_optimal: true,
                objective,
            })
        }
        Ok(Err(message)) => Err(SolveError::Unavailable(message)),
        Err(mpsc::RecvTimeoutError::Timeout) => {
            warn!(?budget, "time budget expired, returning the incumbent");
            Ok(incumbent_outcome(inst, incumbent))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(SolveError::Unavailable(
            "engine worker terminated without a result".into(),
        )),
    }
}

fn incumbent_outcome(inst: &Instance<'_>, assignment: Vec<usize>) -> Outcome {
    let objective = inst.assignment_cost(&assignment);
    Outcome {
        assignment,
        certified_optimal: false,
        objective,
    }
}

/// Owned model data, movable onto the worker thread.
struct ModelSpec {
    n_students: usize,
    n_projects: usize,
    /// `(student, project, cost coefficient, tie-break coefficient)` per
    /// eligible pair.
    pairs: Vec<(usize, usize, f64, f64)>,
    /// Supervisor → (owned project indices, capacity).
    quotas: Vec<(Vec<usize>, usize)>,
}

impl ModelSpec {
    fn build(inst: &Instance<'_>, variance_weight: f64) -> Self {
        let n = inst.n_students() as f64;

        let mut pairs = Vec::new();
        for s in 0..inst.n_students() {
            // Earlier dictators weigh more; preferred-in-ties projects
            // cost less. The product ordering is the serial dictatorship
            // by the rearrangement inequality.
            let w = (inst.n_students() - inst.student_rank[s]) as f64 / n;
            for p in inst.eligibility.eligible_projects(s) {
                let c = inst.cost[s][p];
                let cost = c + variance_weight * c * c / n;
                let u = (inst.project_rank[p] + 1) as f64 / (inst.n_projects() + 1) as f64;
                pairs.push((s, p, cost, w * u));
            }
        }

        let quotas = inst
            .capacity
            .iter()
            .enumerate()
            .map(|(k, &cap)| {
                let owned = (0..inst.n_projects())
                    .filter(|&p| inst.supervisor_of[p] == Some(k))
                    .collect();
                (owned, cap)
            })
            .collect();

        Self {
            n_students: inst.n_students(),
            n_projects: inst.n_projects(),
            pairs,
            quotas,
        }
    }

    fn run(self) -> Result<Vec<usize>, String> {
        // Stage 1: the optimal cost sum, computed from the chosen pairs
        // rather than the engine's reported objective.
        let first = self.solve_stage(None)?;
        let optimal_cost: f64 = first
            .iter()
            .enumerate()
            .map(|(s, &p)| self.pair_cost(s, p))
            .sum();

        // Stage 2: among the cost optima, the canonical tie-break choice.
        self.solve_stage(Some(optimal_cost))
    }

    /// Builds and solves the model once. Without a cost cap the cost sum
    /// is the objective; with one, the cost sum is pinned to it and the
    /// tie-break sum becomes the objective.
    fn solve_stage(&self, cost_cap: Option<f64>) -> Result<Vec<usize>, String> {
        let mut vars = variables!();
        let x: Vec<Variable> = self
            .pairs
            .iter()
            .map(|_| vars.add(variable().binary()))
            .collect();

        let cost_sum: Expression = self
            .pairs
            .iter()
            .zip(&x)
            .map(|((_, _, cost, _), v)| *cost * *v)
            .sum();
        let objective: Expression = match cost_cap {
            None => cost_sum.clone(),
            Some(_) => self
                .pairs
                .iter()
                .zip(&x)
                .map(|((_, _, _, tie), v)| *tie * *v)
                .sum(),
        };
        let mut model = vars.minimise(objective).using(default_solver);
        if let Some(cap) = cost_cap {
            model.add_constraint(constraint!(cost_sum <= cap + STAGE_TOLERANCE));
        }

        for s in 0..self.n_students {
            let takes_one: Expression = self
                .pairs
                .iter()
                .zip(&x)
                .filter(|((ps, _, _, _), _)| *ps == s)
                .map(|(_, v)| *v)
                .sum();
            model.add_constraint(constraint!(takes_one == 1));
        }
        for p in 0..self.n_projects {
            let slot_load: Expression = self
                .pairs
                .iter()
                .zip(&x)
                .filter(|((_, pp, _, _), _)| *pp == p)
                .map(|(_, v)| *v)
                .sum();
            model.add_constraint(constraint!(slot_load <= 1));
        }
        for (owned, cap) in &self.quotas {
            let quota_load: Expression = self
                .pairs
                .iter()
                .zip(&x)
                .filter(|((_, pp, _, _), _)| owned.contains(pp))
                .map(|(_, v)| *v)
                .sum();
            model.add_constraint(constraint!(quota_load <= *cap as f64));
        }

        let solution = model.solve().map_err(|e| e.to_string())?;

        let mut assignment = vec![usize::MAX; self.n_students];
        for ((s, p, _, _), v) in self.pairs.iter().zip(&x) {
            if solution.value(*v) > 0.5 {
                assignment[*s] = *p;
            }
        }
        if assignment.contains(&usize::MAX) {
            return Err("engine returned an incomplete assignment".into());
        }
        Ok(assignment)
    }

    fn pair_cost(&self, s: usize, p: usize) -> f64 {
        self.pairs
            .iter()
            .find(|(ps, pp, _, _)| *ps == s && *pp == p)
            .map(|(_, _, cost, _)| *cost)
            .unwrap_or(0.0)
    }
}
