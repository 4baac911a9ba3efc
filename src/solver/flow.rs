//! Feasibility oracle.
//!
//! Answers "can every student be placed at all?" before any cost is
//! considered, by running augmenting-path maximum flow over the
//! eligibility/capacity network:
//!
//! ```text
//! source → student (1) → eligible project (1) → supervisor (capacity) → sink
//!                                      └─ unowned project (1) ──────────┘
//! ```
//!
//! A full matching doubles as the incumbent the optimizer falls back to
//! when its budget expires. Neighbor scanning is in node-index order, so
//! the oracle is deterministic.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 26.2 (Edmonds–Karp)

use std::collections::VecDeque;

use super::{Instance, SolveError};

/// Completes a partial student → project matching, or proves it cannot
/// be completed.
///
/// `partial` entries already present are kept matched (augmenting may
/// move a student between projects, never unmatch them). On failure the
/// error names every student a maximum matching leaves uncovered.
pub(crate) fn complete_assignment(
    inst: &Instance<'_>,
    partial: &[Option<usize>],
) -> Result<Vec<usize>, SolveError> {
    let mut net = Network::build(inst);
    for (s, p) in partial.iter().enumerate() {
        if let Some(p) = *p {
            net.seed_unit(inst, s, p);
        }
    }
    for s in 0..inst.n_students() {
        if partial[s].is_none() {
            net.augment_from_source();
        }
    }
    net.extract_assignment(inst)
}

/// Finds a full assignment ignoring costs, or proves infeasibility.
pub(crate) fn maximum_assignment(inst: &Instance<'_>) -> Result<Vec<usize>, SolveError> {
    complete_assignment(inst, &vec![None; inst.n_students()])
}

/// Residual network over dense node-indexed capacities.
struct Network {
    n_students: usize,
    n_projects: usize,
    /// `residual[u][v]` = remaining capacity on the u → v edge.
    residual: Vec<Vec<i64>>,
}

impl Network {
    const SOURCE: usize = 0;

    fn build(inst: &Instance<'_>) -> Self {
        let (ns, np, nk) = (inst.n_students(), inst.n_projects(), inst.n_supervisors());
        let n_nodes = 2 + ns + np + nk;
        let mut residual = vec![vec![0i64; n_nodes]; n_nodes];
        let sink = n_nodes - 1;

        for s in 0..ns {
            residual[Self::SOURCE][1 + s] = 1;
            for p in inst.eligibility.eligible_projects(s) {
                residual[1 + s][1 + ns + p] = 1;
            }
        }
        for p in 0..np {
            match inst.supervisor_of[p] {
                Some(k) => residual[1 + ns + p][1 + ns + np + k] = 1,
                None => residual[1 + ns + p][sink] = 1,
            }
        }
        for k in 0..nk {
            residual[1 + ns + np + k][sink] = inst.capacity[k] as i64;
        }

        Self {
            n_students: ns,
            n_projects: np,
            residual,
        }
    }

    fn sink(&self) -> usize {
        self.residual.len() - 1
    }

    /// Pushes one unit along source → s → p → (supervisor | sink),
    /// installing an existing matched pair as flow.
    fn seed_unit(&mut self, inst: &Instance<'_>, s: usize, p: usize) {
        let (ns, np) = (self.n_students, self.n_projects);
        let tail = match inst.supervisor_of[p] {
            Some(k) => 1 + ns + np + k,
            None => self.sink(),
        };
        let path = [Self::SOURCE, 1 + s, 1 + ns + p, tail];
        for w in path.windows(2) {
            self.residual[w[0]][w[1]] -= 1;
            self.residual[w[1]][w[0]] += 1;
        }
        if tail != self.sink() {
            let sink = self.sink();
            self.residual[tail][sink] -= 1;
            self.residual[sink][tail] += 1;
        }
    }

    /// One BFS augmentation from source to sink; true if a unit was pushed.
    fn augment_from_source(&mut self) -> bool {
        let n = self.residual.len();
        let sink = self.sink();
        let mut parent = vec![usize::MAX; n];
        parent[Self::SOURCE] = Self::SOURCE;
        let mut queue = VecDeque::from([Self::SOURCE]);

        while let Some(u) = queue.pop_front() {
            if u == sink {
                break;
            }
            for v in 0..n {
                if parent[v] == usize::MAX && self.residual[u][v] > 0 {
                    parent[v] = u;
                    queue.push_back(v);
                }
            }
        }
        if parent[sink] == usize::MAX {
            return false;
        }

        let mut v = sink;
        while v != Self::SOURCE {
            let u = parent[v];
            self.residual[u][v] -= 1;
            self.residual[v][u] += 1;
            v = u;
        }
        true
    }

    /// Reads the student → project flow edges back out.
    fn extract_assignment(&self, inst: &Instance<'_>) -> Result<Vec<usize>, SolveError> {
        let (ns, np) = (self.n_students, self.n_projects);
        let mut assignment = Vec::with_capacity(ns);
        let mut uncovered = Vec::new();
        for s in 0..ns {
            // A student's matched project is the one whose reverse
            // residual edge carries their unit.
            let matched = (0..np).find(|&p| self.residual[1 + ns + p][1 + s] > 0);
            match matched {
                Some(p) => assignment.push(p),
                None => uncovered.push(inst.student_ids[s].clone()),
            }
        }
        if uncovered.is_empty() {
            Ok(assignment)
        } else {
            Err(SolveError::Infeasible { students: uncovered })
        }
    }
}
