//! Deterministic many-to-one stable matching.
//!
//! Students hold strict preference lists (dissatisfaction, ties split by
//! the project tie-break permutation); projects are indifferent subject
//! to eligibility; supervisors impose quotas. Three phases:
//!
//! 1. Proposal: students claim their best free project in tie-break order.
//! 2. Completion: augmenting paths place anyone left out, or the solve
//!    fails as infeasible.
//! 3. Improvement: while any student strictly prefers a project with a
//!    free slot and free quota, move them.
//!
//! Each move strictly decreases the student's (cost, tie-break) key, so
//! phase 3 terminates; on termination no student prefers reachable free
//! capacity, which with indifferent projects means no blocking pair
//! remains. The result is stable but carries no optimality certificate.
//!
//! # Reference
//! Roth & Sotomayor (1990), "Two-Sided Matching", Ch. 5 (many-to-one)

use tracing::debug;

use super::{flow, Instance, Outcome, SolveError};

pub(crate) fn solve(inst: &Instance<'_>) -> Result<Outcome, SolveError> {
    let order = inst.students_by_rank();
    let prefs: Vec<Vec<usize>> = (0..inst.n_students())
        .map(|s| preference_list(inst, s))
        .collect();

    let mut state = State::new(inst);

    // Phase 1: serial proposals in tie-break order.
    for &s in &order {
        if let Some(&p) = prefs[s].iter().find(|&&p| state.has_room(inst, p)) {
            state.place(inst, s, p);
        }
    }
    debug!(
        matched = state.assigned.iter().filter(|a| a.is_some()).count(),
        students = inst.n_students(),
        "proposal phase done"
    );

    // Phase 2: place everyone left out, or fail.
    let mut assignment = flow::complete_assignment(inst, &state.assigned)?;
    state.reload(inst, &assignment);

    // Phase 3: moves to strictly preferred free capacity, to fixpoint.
    let mut moved = true;
    while moved {
        moved = false;
        for &s in &order {
            let current = assignment[s];
            let better = prefs[s]
                .iter()
                .take_while(|&&p| p != current)
                .find(|&&p| state.has_room(inst, p));
            if let Some(&target) = better {
                state.vacate(inst, s, current);
                state.place(inst, s, target);
                assignment[s] = target;
                moved = true;
            }
        }
    }

    let objective = inst.assignment_cost(&assignment);
    debug!(objective, "stable matching converged");
    Ok(Outcome {
        assignment,
        certified_optimal: false,
        objective,
    })
}

/// Eligible projects in strictly descending preference: by cost, ties by
/// the project tie-break permutation.
fn preference_list(inst: &Instance<'_>, s: usize) -> Vec<usize> {
    let mut projects: Vec<usize> = inst.eligibility.eligible_projects(s).collect();
    projects.sort_by(|&a, &b| {
        inst.cost[s][a]
            .total_cmp(&inst.cost[s][b])
            .then_with(|| inst.project_rank[a].cmp(&inst.project_rank[b]))
    });
    projects
}

/// Occupancy bookkeeping for slots and quotas.
struct State {
    assigned: Vec<Option<usize>>,
    slot_taken: Vec<bool>,
    quota_used: Vec<usize>,
}

impl State {
    fn new(inst: &Instance<'_>) -> Self {
        Self {
            assigned: vec![None; inst.n_students()],
            slot_taken: vec![false; inst.n_projects()],
            quota_used: vec![0; inst.n_supervisors()],
        }
    }

    fn reload(&mut self, inst: &Instance<'_>, assignment: &[usize]) {
        *self = Self::new(inst);
        for (s, &p) in assignment.iter().enumerate() {
            self.place(inst, s, p);
        }
    }

    fn has_room(&self, inst: &Instance<'_>, p: usize) -> bool {
        if self.slot_taken[p] {
            return false;
        }
        match inst.supervisor_of[p] {
            Some(k) => self.quota_used[k] < inst.capacity[k],
            None => true,
        }
    }

    fn place(&mut self, inst: &Instance<'_>, s: usize, p: usize) {
        self.assigned[s] = Some(p);
        self.slot_taken[p] = true;
        if let Some(k) = inst.supervisor_of[p] {
            self.quota_used[k] += 1;
        }
    }

    fn vacate(&mut self, inst: &Instance<'_>, s: usize, p: usize) {
        self.assigned[s] = None;
        self.slot_taken[p] = false;
        if let Some(k) = inst.supervisor_of[p] {
            self.quota_used[k] -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::EligibilityMatrix;

    struct Fixture {
        student_ids: Vec<String>,
        cost: Vec<Vec<f64>>,
        eligibility: EligibilityMatrix,
        supervisor_of: Vec<Option<usize>>,
        capacity: Vec<usize>,
        student_rank: Vec<usize>,
        project_rank: Vec<usize>,
    }

    impl Fixture {
        fn new(cost: Vec<Vec<f64>>, n_projects: usize) -> Self {
            let n_students = cost.len();
            Self {
                student_ids: (0..n_students).map(|i| format!("s{i}")).collect(),
                cost,
                eligibility: EligibilityMatrix::all_eligible(n_students, n_projects),
                supervisor_of: vec![None; n_projects],
                capacity: Vec::new(),
                student_rank: (0..n_students).collect(),
                project_rank: (0..n_projects).collect(),
            }
        }

        fn instance(&self) -> Instance<'_> {
            Instance {
                student_ids: &self.student_ids,
                cost: &self.cost,
                eligibility: &self.eligibility,
                supervisor_of: &self.supervisor_of,
                capacity: &self.capacity,
                student_rank: &self.student_rank,
                project_rank: &self.project_rank,
            }
        }
    }

    /// No student strictly prefers a project left with free capacity.
    fn assert_no_blocking_pair(fx: &Fixture, assignment: &[usize]) {
        let inst = fx.instance();
        let mut state = State::new(&inst);
        state.reload(&inst, assignment);
        for (s, &p) in assignment.iter().enumerate() {
            for q in inst.eligibility.eligible_projects(s) {
                if inst.cost[s][q] < inst.cost[s][p] {
                    assert!(
                        !state.has_room(&inst, q),
                        "student {s} on {p} prefers free project {q}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_distinct_top_choices() {
        // Everyone wants a different project; everyone gets rank 1.
        let fx = Fixture::new(
            vec![
                vec![1.0, 2.0, 3.0],
                vec![3.0, 1.0, 2.0],
                vec![2.0, 3.0, 1.0],
            ],
            3,
        );
        let outcome = solve(&fx.instance()).unwrap();
        assert_eq!(outcome.assignment, vec![0, 1, 2]);
        assert_eq!(outcome.objective, 3.0);
        assert!(!outcome.certified_optimal);
    }

    #[test]
    fn test_contested_top_choice_goes_to_first_dictator() {
        // Both want p0; s1 has the earlier tie-break position.
        let mut fx = Fixture::new(vec![vec![1.0, 2.0], vec![1.0, 2.0]], 2);
        fx.student_rank = vec![1, 0];
        let outcome = solve(&fx.instance()).unwrap();
        assert_eq!(outcome.assignment, vec![1, 0]);
    }

    #[test]
    fn test_stability_after_completion_rerouting() {
        // s2 only tolerates p0, which phase 1 hands to s0; the completion
        // reroutes and the improvement loop re-settles everyone.
        let mut fx = Fixture::new(
            vec![
                vec![1.0, 2.0, 3.0],
                vec![1.0, 2.0, 3.0],
                vec![1.0, 9.0, 9.0],
            ],
            3,
        );
        fx.eligibility.set(2, 1, false);
        fx.eligibility.set(2, 2, false);
        let outcome = solve(&fx.instance()).unwrap();
        assert_eq!(outcome.assignment[2], 0);
        assert_no_blocking_pair(&fx, &outcome.assignment);
    }

    #[test]
    fn test_supervisor_quota_respected() {
        // Three students, three projects under one supervisor with quota
        // 2 plus one unowned fallback.
        let mut fx = Fixture::new(
            vec![
                vec![1.0, 2.0, 3.0, 4.0],
                vec![1.0, 2.0, 3.0, 4.0],
                vec![1.0, 2.0, 3.0, 4.0],
            ],
            4,
        );
        fx.supervisor_of = vec![Some(0), Some(0), Some(0), None];
        fx.capacity = vec![2];
        let outcome = solve(&fx.instance()).unwrap();
        let supervised = outcome
            .assignment
            .iter()
            .filter(|&&p| fx.supervisor_of[p].is_some())
            .count();
        assert_eq!(supervised, 2);
        assert_no_blocking_pair(&fx, &outcome.assignment);
    }

    #[test]
    fn test_infeasible_surfaces() {
        let mut fx = Fixture::new(vec![vec![1.0, 2.0], vec![1.0, 2.0]], 2);
        // Both students restricted to p0.
        fx.eligibility.set(0, 1, false);
        fx.eligibility.set(1, 1, false);
        let err = solve(&fx.instance()).unwrap_err();
        assert!(matches!(err, SolveError::Infeasible { .. }));
    }

    #[test]
    fn test_equal_costs_follow_tie_break_permutations() {
        // Total indifference: outcome is dictated purely by the seeded
        // permutations, deterministically.
        let mut fx = Fixture::new(vec![vec![1.5; 3]; 3], 3);
        fx.student_rank = vec![2, 0, 1];
        fx.project_rank = vec![1, 2, 0];
        let outcome = solve(&fx.instance()).unwrap();
        // Dictator order s1, s2, s0; preferred project order p2, p0, p1.
        assert_eq!(outcome.assignment, vec![1, 2, 0]);
        let again = solve(&fx.instance()).unwrap();
        assert_eq!(outcome.assignment, again.assignment);
    }
}
