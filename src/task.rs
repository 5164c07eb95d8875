//! Prep task model: the unit of work the scheduler places on the timeline.

use serde::{Deserialize, Serialize};

use crate::units::{minutes, Minutes};
use crate::Id;

/// What kind of cooking work a task represents.
///
/// The scheduler itself is type-agnostic; the parallel optimiser and the
/// conflict resolver use the type to tell hands-off stretches (a simmering
/// pot) from hands-on work (knife work at the board).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Prep,
    Cook,
    Bake,
    Simmer,
    Rest,
    Assemble,
    Clean,
}

impl TaskType {
    /// True for types that run without an operator once started.
    pub fn is_hands_off(self) -> bool {
        matches!(self, TaskType::Simmer | TaskType::Bake | TaskType::Rest)
    }
}

/// Scheduling priority. Lower rank schedules first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    /// Numeric rank used as a sort key: critical ≺ high ≺ medium ≺ low.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Critical => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

/// A single schedulable cooking task.
///
/// # Invariants
///
/// - `duration` and `cleaning_time` are non-negative
/// - `equipment` names at least one equipment id; ids that do not resolve in
///   the registry are warned about and treated as single-slot
/// - `dependencies` must all resolve within the task set handed to the
///   planner, and the resulting graph must be acyclic (validated at build)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepTask {
    pub id: Id,
    pub name: String,
    pub task_type: TaskType,
    #[serde(with = "crate::units::minute_repr")]
    pub duration: Minutes,
    pub equipment: Vec<Id>,
    #[serde(default)]
    pub dependencies: Vec<Id>,
    pub priority: Priority,
    pub requires_attention: bool,
    pub can_parallel: bool,
    #[serde(with = "crate::units::minute_repr")]
    pub cleaning_time: Minutes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PrepTask {
    pub fn new(
        id: impl Into<Id>,
        name: impl Into<String>,
        task_type: TaskType,
        duration: Minutes,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            task_type,
            duration,
            equipment: Vec::new(),
            dependencies: Vec::new(),
            priority: Priority::Medium,
            requires_attention: false,
            can_parallel: false,
            cleaning_time: minutes(0.0),
            temperature: None,
            notes: None,
        }
    }

    pub fn with_equipment(mut self, equipment: impl IntoIterator<Item = impl Into<Id>>) -> Self {
        self.equipment = equipment.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dependencies(
        mut self,
        dependencies: impl IntoIterator<Item = impl Into<Id>>,
    ) -> Self {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_attention(mut self, requires_attention: bool) -> Self {
        self.requires_attention = requires_attention;
        self
    }

    pub fn with_parallel(mut self, can_parallel: bool) -> Self {
        self.can_parallel = can_parallel;
        self
    }

    pub fn with_cleaning_time(mut self, cleaning_time: Minutes) -> Self {
        self.cleaning_time = cleaning_time;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}
