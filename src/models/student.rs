//! Student model.

use serde::{Deserialize, Serialize};

/// A student to be assigned exactly one project.
///
/// Ranks are raw, in the notation declared by the solve configuration:
/// positive, smaller is better, ties permitted. They are converted and
/// validated when the problem is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Unique student identifier.
    pub id: String,
    /// `(project id, raw rank)` pairs; projects left out are unranked.
    pub ranks: Vec<(String, f64)>,
}

impl Student {
    /// Creates a student with no expressed preferences.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ranks: Vec::new(),
        }
    }

    /// Adds one raw rank.
    pub fn with_rank(mut self, project: impl Into<String>, rank: f64) -> Self {
        self.ranks.push((project.into(), rank));
        self
    }

    /// Adds several raw ranks at once.
    pub fn with_ranks<I, S>(mut self, ranks: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        self.ranks
            .extend(ranks.into_iter().map(|(p, r)| (p.into(), r)));
        self
    }

    /// Whether the student expressed any preference at all.
    pub fn has_preferences(&self) -> bool {
        !self.ranks.is_empty()
    }

    /// Whether the student ranked the given project.
    pub fn ranked(&self, project: &str) -> bool {
        self.ranks.iter().any(|(p, _)| p == project)
    }
}
