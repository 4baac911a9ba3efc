//! Problem construction and solve dispatch.
//!
//! `Problem::new` is the single entry point: it validates the entities,
//! canonicalizes their order (sorted by id, so arrival order is
//! invisible), builds each student's preference table and the dense cost
//! table, resolves eligibility, and derives the seeded tie-break
//! permutations. `solve` then dispatches to the configured strategy and
//! wraps the raw outcome into an immutable [`Solution`].
//!
//! The tie-break permutations are the only randomness in the crate: one
//! `StdRng` stream seeded from the config, students shuffled first, then
//! projects. Everything downstream is a pure function of them.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::eligibility::{EligibilityMatrix, EligibilityRules};
use crate::models::{BlockingPair, Project, Solution, SolveConfig, SolveMethod, Student, Supervisor};
use crate::preferences::Preferences;
use crate::solver::{self, Instance, Outcome, SolveError};
use crate::validation::{
    validate_input, ValidationError, ValidationErrorKind, ValidationFailure,
};

/// A validated, canonicalized allocation problem, ready to solve.
#[derive(Debug)]
pub struct Problem {
    students: Vec<Student>,
    projects: Vec<Project>,
    student_ids: Vec<String>,
    project_ids: Vec<String>,
    supervisor_ids: Vec<String>,
    preferences: Vec<Preferences>,
    cost: Vec<Vec<f64>>,
    eligibility: EligibilityMatrix,
    /// Project index → supervisor index, if owned.
    supervisor_of: Vec<Option<usize>>,
    /// Supervisor index → student capacity.
    capacity: Vec<usize>,
    /// Tie-break position of each student.
    student_rank: Vec<usize>,
    /// Tie-break position of each project.
    project_rank: Vec<usize>,
    config: SolveConfig,
}

impl Problem {
    /// Validates and preprocesses an allocation problem.
    ///
    /// Collects every detected defect rather than stopping at the first;
    /// each error names the offending entity.
    pub fn new(
        mut students: Vec<Student>,
        mut projects: Vec<Project>,
        mut supervisors: Vec<Supervisor>,
        rules: Option<EligibilityRules>,
        config: SolveConfig,
    ) -> Result<Self, ValidationFailure> {
        let mut errors = match validate_input(&students, &projects, &supervisors) {
            Ok(()) => Vec::new(),
            Err(errors) => errors,
        };

        // Canonical order: sorted by id. Arrival order no longer matters.
        students.sort_by(|a, b| a.id.cmp(&b.id));
        projects.sort_by(|a, b| a.id.cmp(&b.id));
        supervisors.sort_by(|a, b| a.id.cmp(&b.id));

        let student_ids: Vec<String> = students.iter().map(|s| s.id.clone()).collect();
        let project_ids: Vec<String> = projects.iter().map(|p| p.id.clone()).collect();
        let supervisor_ids: Vec<String> = supervisors.iter().map(|s| s.id.clone()).collect();

        let supervisor_of: Vec<Option<usize>> = projects
            .iter()
            .map(|p| {
                p.supervisor
                    .as_deref()
                    .and_then(|sup| supervisor_ids.iter().position(|id| id == sup))
            })
            .collect();
        let capacity: Vec<usize> = supervisors
            .iter()
            .enumerate()
            .map(|(k, sup)| {
                let owned = supervisor_of.iter().filter(|&&o| o == Some(k)).count();
                sup.capacity.unwrap_or(owned)
            })
            .collect();

        // Preference tables; rank defects are reported per student.
        let mut preferences = Vec::with_capacity(students.len());
        for s in &students {
            match Preferences::build(
                project_ids.len(),
                &s.ranks,
                config.rank_notation,
                config.preference_power,
            ) {
                Ok(p) => preferences.push(p),
                Err(e) => {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::InvalidRank,
                        format!("Student '{}' has invalid ranks: {e}", s.id),
                    ));
                    // Placeholder keeping indices aligned while other
                    // students are still checked.
                    preferences.push(
                        Preferences::build(
                            project_ids.len(),
                            &[],
                            config.rank_notation,
                            1.0,
                        )
                        .unwrap_or_else(|_| unreachable!("empty ranking is always valid")),
                    );
                }
            }
        }

        let eligibility = match &rules {
            Some(rules) => match EligibilityMatrix::resolve(rules, &student_ids, &project_ids) {
                Ok(m) => m,
                Err(e) => {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::UnknownEligibilityEntity,
                        e.to_string(),
                    ));
                    EligibilityMatrix::all_eligible(student_ids.len(), project_ids.len())
                }
            },
            None => EligibilityMatrix::all_eligible(student_ids.len(), project_ids.len()),
        };

        if !errors.is_empty() {
            return Err(ValidationFailure(errors));
        }

        let cost: Vec<Vec<f64>> = preferences
            .iter()
            .map(|prefs| {
                project_ids
                    .iter()
                    .map(|pid| prefs.dissatisfaction(pid))
                    .collect()
            })
            .collect();

        // One seeded stream: students shuffled first, then projects.
        let mut rng = StdRng::seed_from_u64(config.seed);
        let student_rank = shuffled_ranks(students.len(), &mut rng);
        let project_rank = shuffled_ranks(projects.len(), &mut rng);

        Ok(Self {
            students,
            projects,
            student_ids,
            project_ids,
            supervisor_ids,
            preferences,
            cost,
            eligibility,
            supervisor_of,
            capacity,
            student_rank,
            project_rank,
            config,
        })
    }

    /// Solves the problem with the configured strategy.
    ///
    /// Budget expiry is not an error: the optimizer then yields its
    /// incumbent flagged non-optimal. `OptimizeThenFallback` falls back
    /// to stable matching only if the engine itself malfunctions.
    pub fn solve(&self) -> Result<Solution, SolveError> {
        let inst = self.instance();
        info!(
            students = self.student_ids.len(),
            projects = self.project_ids.len(),
            method = ?self.config.method,
            "solving allocation problem"
        );

        let (outcome, method) = match self.config.method {
            SolveMethod::Optimize => (
                solver::mip::solve(&inst, self.config.variance_weight, self.config.time_budget)?,
                SolveMethod::Optimize,
            ),
            SolveMethod::StableMatching => {
                (solver::matching::solve(&inst)?, SolveMethod::StableMatching)
            }
            SolveMethod::OptimizeThenFallback => {
                match solver::mip::solve(&inst, self.config.variance_weight, self.config.time_budget)
                {
                    Ok(outcome) => (outcome, SolveMethod::Optimize),
                    Err(SolveError::Unavailable(reason)) => {
                        warn!(%reason, "engine unavailable, falling back to stable matching");
                        (solver::matching::solve(&inst)?, SolveMethod::StableMatching)
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        info!(
            objective = outcome.objective,
            optimal = outcome.certified_optimal,
            "solve finished"
        );
        Ok(self.wrap(outcome, method))
    }

    /// How many students ranked each project, in canonical project order.
    pub fn project_popularity(&self) -> Vec<(String, usize)> {
        self.project_ids
            .iter()
            .map(|pid| {
                let n = self
                    .preferences
                    .iter()
                    .filter(|prefs| prefs.is_ranked(pid))
                    .count();
                (pid.clone(), n)
            })
            .collect()
    }

    /// The preference table built for a student.
    pub fn preferences_for(&self, student: &str) -> Option<&Preferences> {
        let idx = self.student_ids.iter().position(|id| id == student)?;
        Some(&self.preferences[idx])
    }

    /// Canonical (sorted) student ids.
    pub fn student_ids(&self) -> &[String] {
        &self.student_ids
    }

    /// Canonical (sorted) project ids.
    pub fn project_ids(&self) -> &[String] {
        &self.project_ids
    }

    pub fn n_students(&self) -> usize {
        self.students.len()
    }

    pub fn n_projects(&self) -> usize {
        self.projects.len()
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

    fn wrap(&self, outcome: Outcome, method: SolveMethod) -> Solution {
        let assignment: BTreeMap<String, String> = outcome
            .assignment
            .iter()
            .enumerate()
            .map(|(s, &p)| (self.student_ids[s].clone(), self.project_ids[p].clone()))
            .collect();
        let scores: BTreeMap<String, f64> = outcome
            .assignment
            .iter()
            .enumerate()
            .map(|(s, &p)| (self.student_ids[s].clone(), self.cost[s][p]))
            .collect();
        let supervisor_of: BTreeMap<String, String> = self
            .supervisor_of
            .iter()
            .enumerate()
            .filter_map(|(p, k)| {
                k.map(|k| (self.project_ids[p].clone(), self.supervisor_ids[k].clone()))
            })
            .collect();

        // Assigned projects' tie-break indices in student tie-break order.
        let mut order: Vec<usize> = (0..self.students.len()).collect();
        order.sort_by_key(|&s| self.student_rank[s]);
        let tie_break_key: Vec<usize> = order
            .iter()
            .map(|&s| self.project_rank[outcome.assignment[s]])
            .collect();

        let blocking_pairs = self.blocking_pairs(&outcome.assignment);

        Solution {
            assignment,
            scores,
            supervisor_of,
            method,
            optimal: outcome.certified_optimal,
            objective: outcome.objective,
            tie_break_key,
            blocking_pairs,
        }
    }

    /// Students who strictly prefer a project with a free slot and free
    /// supervisor quota over their assignment.
    fn blocking_pairs(&self, assignment: &[usize]) -> Vec<BlockingPair> {
        let mut slot_taken = vec![false; self.projects.len()];
        let mut quota_used = vec![0usize; self.capacity.len()];
        for &p in assignment {
            slot_taken[p] = true;
            if let Some(k) = self.supervisor_of[p] {
                quota_used[k] += 1;
            }
        }

        let mut pairs = Vec::new();
        for (s, &assigned) in assignment.iter().enumerate() {
            for q in self.eligibility.eligible_projects(s) {
                if slot_taken[q] || self.cost[s][q] >= self.cost[s][assigned] {
                    continue;
                }
                let quota_free = match self.supervisor_of[q] {
                    Some(k) => quota_used[k] < self.capacity[k],
                    None => true,
                };
                if quota_free {
                    pairs.push(BlockingPair {
                        student: self.student_ids[s].clone(),
                        assigned: self.project_ids[assigned].clone(),
                        preferred: self.project_ids[q].clone(),
                    });
                }
            }
        }
        pairs
    }
}

fn shuffled_ranks(n: usize, rng: &mut StdRng) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);
    // order[i] sits at tie-break position i; invert to index by entity.
    let mut rank = vec![0; n];
    for (position, &entity) in order.iter().enumerate() {
        rank[entity] = position;
    }
    rank
}
