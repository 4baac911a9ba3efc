//! Student/project eligibility.
//!
//! Eligibility is a hard constraint: both solving strategies omit
//! ineligible pairs entirely rather than penalizing them. The constraint is
//! expressed as explicit rules keyed by entity id and resolved once, at
//! problem construction, into a dense boolean matrix over canonical
//! (student, project) indices. Solvers only ever see the resolved matrix.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How an explicit pair list is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestrictionMode {
    /// Listed pairs are the only permitted assignments for the students
    /// they mention; unmentioned students stay eligible for everything.
    Allow,
    /// Listed pairs are forbidden; everything else stays eligible.
    Deny,
}

/// Explicit eligibility restrictions, keyed by entity id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityRules {
    pub mode: RestrictionMode,
    /// `(student id, project id)` pairs.
    pub pairs: Vec<(String, String)>,
}

impl EligibilityRules {
    /// Allow-list rules: each listed student may only take listed projects.
    pub fn allow(pairs: Vec<(String, String)>) -> Self {
        Self { mode: RestrictionMode::Allow, pairs }
    }

    /// Deny-list rules: listed pairs are forbidden.
    pub fn deny(pairs: Vec<(String, String)>) -> Self {
        Self { mode: RestrictionMode::Deny, pairs }
    }
}

/// A rule that references an entity the problem does not contain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EligibilityError {
    #[error("eligibility rule references unknown student {0:?}")]
    UnknownStudent(String),
    #[error("eligibility rule references unknown project {0:?}")]
    UnknownProject(String),
}

/// Resolved boolean compatibility relation over canonical indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityMatrix {
    n_students: usize,
    n_projects: usize,
    /// Row-major: `grid[s * n_projects + p]`.
    grid: Vec<bool>,
}

impl EligibilityMatrix {
    /// A matrix where every pair is eligible.
    pub fn all_eligible(n_students: usize, n_projects: usize) -> Self {
        Self {
            n_students,
            n_projects,
            grid: vec![true; n_students * n_projects],
        }
    }

    /// Resolves rules against canonically ordered student and project ids.
    ///
    /// `student_ids` and `project_ids` must be the problem's canonical
    /// (sorted) id sequences; the resulting matrix is indexed accordingly.
    pub fn resolve(
        rules: &EligibilityRules,
        student_ids: &[String],
        project_ids: &[String],
    ) -> Result<Self, EligibilityError> {
        let student_index = |id: &str| {
            student_ids
                .iter()
                .position(|s| s == id)
                .ok_or_else(|| EligibilityError::UnknownStudent(id.to_string()))
        };
        let project_index = |id: &str| {
            project_ids
                .iter()
                .position(|p| p == id)
                .ok_or_else(|| EligibilityError::UnknownProject(id.to_string()))
        };

        let mut matrix = Self::all_eligible(student_ids.len(), project_ids.len());
        match rules.mode {
            RestrictionMode::Allow => {
                // Students mentioned by any rule are restricted to exactly
                // their listed projects; others keep the default.
                let mut mentioned = vec![false; student_ids.len()];
                let mut indexed = Vec::with_capacity(rules.pairs.len());
                for (sid, pid) in &rules.pairs {
                    let s = student_index(sid)?;
                    let p = project_index(pid)?;
                    mentioned[s] = true;
                    indexed.push((s, p));
                }
                for (s, restricted) in mentioned.iter().enumerate() {
                    if *restricted {
                        for p in 0..project_ids.len() {
                            matrix.set(s, p, false);
                        }
                    }
                }
                for (s, p) in indexed {
                    matrix.set(s, p, true);
                }
            }
            RestrictionMode::Deny => {
                for (sid, pid) in &rules.pairs {
                    let s = student_index(sid)?;
                    let p = project_index(pid)?;
                    matrix.set(s, p, false);
                }
            }
        }
        Ok(matrix)
    }

    /// Whether the student may be assigned the project.
    #[inline]
    pub fn is_eligible(&self, student: usize, project: usize) -> bool {
        self.grid[student * self.n_projects + project]
    }

    /// Sets one cell of the relation.
    pub fn set(&mut self, student: usize, project: usize, eligible: bool) {
        self.grid[student * self.n_projects + project] = eligible;
    }

    /// Whether no restriction is in force at all.
    pub fn all_pairs_eligible(&self) -> bool {
        self.grid.iter().all(|&e| e)
    }

    /// Indices of projects the student is eligible for, ascending.
    pub fn eligible_projects(&self, student: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.n_projects).filter(move |&p| self.is_eligible(student, p))
    }

    /// Number of eligible projects for the student.
    pub fn eligible_count(&self, student: usize) -> usize {
        self.eligible_projects(student).count()
    }
}
