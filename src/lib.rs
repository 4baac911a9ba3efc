//! Student–project allocation.
//!
//! Assigns a population of students to project slots under supervisor
//! capacities and per-pair eligibility, minimizing aggregate
//! dissatisfaction with respect to stated preference rankings. Identical
//! input yields an identical assignment whatever order the records
//! arrived in: ties are broken by a fixed-seed permutation, never by
//! processing order.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Student`, `Project`, `Supervisor`,
//!   `Solution`, `SolveConfig`
//! - **`ranking`**: Conversion between fractional, competition, and dense
//!   rank notations
//! - **`preferences`**: Rank-based dissatisfaction scoring
//! - **`eligibility`**: Hard (student, project) compatibility rules
//! - **`validation`**: Input integrity checks (duplicate IDs, dangling
//!   references, capacities)
//! - **`problem`**: Problem construction and solve dispatch
//! - **`solver`**: The strategies — exact integer programming under a
//!   time budget, and deterministic stable matching
//!
//! # References
//!
//! - Abraham, Irving & Manlove (2007), "Two algorithms for the
//!   Student-Project Allocation problem"
//! - Roth & Sotomayor (1990), "Two-Sided Matching"

pub mod eligibility;
pub mod models;
pub mod preferences;
pub mod problem;
pub mod ranking;
pub mod solver;
pub mod validation;

pub use eligibility::{EligibilityMatrix, EligibilityRules, RestrictionMode};
pub use models::{Project, Solution, SolveConfig, SolveMethod, Student, Supervisor};
pub use preferences::Preferences;
pub use problem::Problem;
pub use ranking::{convert_ranks, RankNotation};
pub use solver::SolveError;
pub use validation::{ValidationError, ValidationErrorKind, ValidationFailure};
