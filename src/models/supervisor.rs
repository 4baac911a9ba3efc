//! Supervisor model.

use serde::{Deserialize, Serialize};

/// A supervisor with a cap on concurrently supervised students.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supervisor {
    /// Unique supervisor identifier.
    pub id: String,
    /// Maximum students across all owned projects. `None` defaults to
    /// the number of owned project slots (no effective restriction).
    pub capacity: Option<usize>,
}

impl Supervisor {
    /// Creates a supervisor with the default capacity.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            capacity: None,
        }
    }

    /// Sets an explicit capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supervisor_builder() {
        let s = Supervisor::new("dr_grey").with_capacity(2);
        assert_eq!(s.id, "dr_grey");
        assert_eq!(s.capacity, Some(2));

        let open = Supervisor::new("dr_shepherd");
        assert_eq!(open.capacity, None);
    }
}
