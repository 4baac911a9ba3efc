//! Project model.

use serde::{Deserialize, Serialize};

/// A single project slot: takes at most one student.
///
/// A real-world project accepting several students is modelled as that
/// many slots; [`Project::expand`] builds them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique project (slot) identifier.
    pub id: String,
    /// Owning supervisor, if any. Unowned projects escape every
    /// supervisor capacity constraint.
    pub supervisor: Option<String>,
}

impl Project {
    /// Creates an unowned project slot.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            supervisor: None,
        }
    }

    /// Sets the owning supervisor.
    pub fn with_supervisor(mut self, supervisor: impl Into<String>) -> Self {
        self.supervisor = Some(supervisor.into());
        self
    }

    /// Duplicates this project into `copies` distinct slots.
    ///
    /// Slot ids are suffixed `-1`, `-2`, ...; supervisor ownership is
    /// shared. Student preferences must reference the slot ids.
    pub fn expand(self, copies: usize) -> Vec<Project> {
        (1..=copies)
            .map(|k| Project {
                id: format!("{}-{k}", self.id),
                supervisor: self.supervisor.clone(),
            })
            .collect()
    }
}
