//! Input validation for allocation problems.
//!
//! Checks structural integrity of students, projects, and supervisors
//! before solving. Detects:
//! - Duplicate IDs
//! - Missing supervisor references
//! - Ranks naming projects that don't exist
//! - Supervisors with zero capacity
//!
//! Rank-value problems (out-of-range ranks, inconsistent tie notation,
//! non-prefix rank sets) are reported per student when the problem builds
//! its preference tables, using the same error shape.

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

use crate::models::{Project, Student, Supervisor};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description naming the offending entity.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A project references a supervisor that doesn't exist.
    UnknownSupervisor,
    /// A student ranks a project that doesn't exist.
    UnknownProject,
    /// A student's ranks are malformed (range, notation, or prefix).
    InvalidRank,
    /// A supervisor capacity that can never admit a student.
    BadCapacity,
    /// An eligibility rule references an entity that doesn't exist.
    UnknownEligibilityEntity,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// All validation errors from one problem construction.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid problem: {}", display_errors(.0))]
pub struct ValidationFailure(pub Vec<ValidationError>);

fn display_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validates the input data for an allocation problem.
///
/// Checks:
/// 1. No duplicate student IDs
/// 2. No duplicate project IDs
/// 3. No duplicate supervisor IDs
/// 4. All supervisor references in projects point to existing supervisors
/// 5. All project references in student ranks point to existing projects
/// 6. No supervisor has an explicit capacity of zero
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    students: &[Student],
    projects: &[Project],
    supervisors: &[Supervisor],
) -> ValidationResult {
    let mut errors = Vec::new();

    // Collect supervisor IDs
    let mut supervisor_ids = HashSet::new();
    for sup in supervisors {
        if !supervisor_ids.insert(sup.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate supervisor ID: {}", sup.id),
            ));
        }
        if sup.capacity == Some(0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::BadCapacity,
                format!("Supervisor '{}' has capacity 0", sup.id),
            ));
        }
    }

    // Collect project IDs
    let mut project_ids = HashSet::new();
    for p in projects {
        if !project_ids.insert(p.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate project ID: {}", p.id),
            ));
        }
    }

    // Collect student IDs
    let mut student_ids = HashSet::new();
    for s in students {
        if !student_ids.insert(s.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate student ID: {}", s.id),
            ));
        }
    }

    // Check supervisor references
    for p in projects {
        if let Some(sup) = &p.supervisor {
            if !supervisor_ids.contains(sup.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownSupervisor,
                    format!("Project '{}' references unknown supervisor '{}'", p.id, sup),
                ));
            }
        }
    }

    // Check ranked project references
    for s in students {
        for (project, _) in &s.ranks {
            if !project_ids.contains(project.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownProject,
                    format!("Student '{}' ranks unknown project '{}'", s.id, project),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_supervisors() -> Vec<Supervisor> {
        vec![
            Supervisor::new("dr_grey").with_capacity(2),
            Supervisor::new("dr_shepherd"),
        ]
    }

    fn sample_projects() -> Vec<Project> {
        vec![
            Project::new("p1").with_supervisor("dr_grey"),
            Project::new("p2").with_supervisor("dr_grey"),
            Project::new("p3").with_supervisor("dr_shepherd"),
        ]
    }

    fn sample_students() -> Vec<Student> {
        vec![
            Student::new("alice").with_ranks(vec![("p1", 1.0), ("p2", 2.0)]),
            Student::new("bob").with_rank("p3", 1.0),
        ]
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_input(&sample_students(), &sample_projects(), &sample_supervisors()).is_ok());
    }

    #[test]
    fn test_duplicate_student_id() {
        let students = vec![Student::new("alice"), Student::new("alice")];
        let errors =
            validate_input(&students, &sample_projects(), &sample_supervisors()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("student")));
    }

    #[test]
    fn test_duplicate_project_id() {
        let projects = vec![Project::new("p1"), Project::new("p1")];
        let errors = validate_input(&[], &projects, &[]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("project")));
    }

    #[test]
    fn test_unknown_supervisor() {
        let projects = vec![Project::new("p1").with_supervisor("nobody")];
        let errors = validate_input(&[], &projects, &sample_supervisors()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownSupervisor));
    }

    #[test]
    fn test_unknown_ranked_project() {
        let students = vec![Student::new("alice").with_rank("ghost", 1.0)];
        let errors =
            validate_input(&students, &sample_projects(), &sample_supervisors()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownProject));
    }

    #[test]
    fn test_zero_capacity() {
        let supervisors = vec![Supervisor::new("dr_grey").with_capacity(0)];
        let errors = validate_input(&[], &[], &supervisors).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::BadCapacity));
    }

    #[test]
    fn test_multiple_errors() {
        // Duplicate student + unknown ranked project
        let students = vec![
            Student::new("alice").with_rank("ghost", 1.0),
            Student::new("alice"),
        ];
        let errors =
            validate_input(&students, &sample_projects(), &sample_supervisors()).unwrap_err();
        assert!(errors.len() >= 2);
    }

    #[test]
    fn test_failure_display_lists_messages() {
        let failure = ValidationFailure(vec![
            ValidationError::new(ValidationErrorKind::DuplicateId, "Duplicate student ID: a"),
            ValidationError::new(ValidationErrorKind::BadCapacity, "Supervisor 'x' has capacity 0"),
        ]);
        let text = failure.to_string();
        assert!(text.contains("Duplicate student ID: a"));
        assert!(text.contains("capacity 0"));
    }
}
