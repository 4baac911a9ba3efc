//! Allocation domain models.
//!
//! Core data types for stating an allocation problem and holding its
//! result. Domain-agnostic within one-to-one capacitated assignment —
//! students to projects, residents to hospitals, applicants to posts.
//!
//! # Domain Mappings
//!
//! | allot | University | Residency | Recruiting |
//! |------------|-----------------|-----------|------------|
//! | Student | Student | Resident | Applicant |
//! | Project | Project Slot | Post | Opening |
//! | Supervisor | Supervisor | Hospital | Team |
//! | Solution | Allocation | Match | Hiring Plan |

mod config;
mod project;
mod solution;
mod student;
mod supervisor;

pub use config::{
    SolveConfig, SolveMethod, DEFAULT_SEED, DEFAULT_TIME_BUDGET, DEFAULT_VARIANCE_WEIGHT,
};
pub use project::Project;
pub use solution::{BlockingPair, Solution};
pub use student::Student;
pub use supervisor::Supervisor;
