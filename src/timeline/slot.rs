use serde::{Deserialize, Serialize};

use super::span::Span;
use crate::units::Minutes;
use crate::Id;

/// Suffix appended to a task id to form its cleanup slot id. Renderers split
/// on this suffix to pair a cleanup stretch with its owning task.
pub const CLEANUP_SUFFIX: &str = "-cleanup";

/// One occupancy on the timeline: a task (or its trailing cleanup) holding a
/// set of equipment for a span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub task_id: Id,
    pub span: Span,
    pub equipment: Vec<Id>,
    pub is_cleanup: bool,
}

impl TimeSlot {
    pub fn new(task_id: impl Into<Id>, span: Span, equipment: Vec<Id>) -> Self {
        Self {
            task_id: task_id.into(),
            span,
            equipment,
            is_cleanup: false,
        }
    }

    /// Trailing cleanup slot for `owner`, holding the same equipment.
    pub fn cleanup(owner: &str, span: Span, equipment: Vec<Id>) -> Self {
        Self {
            task_id: format!("{owner}{CLEANUP_SUFFIX}"),
            span,
            equipment,
            is_cleanup: true,
        }
    }

    /// The owning task id, with any cleanup suffix stripped.
    pub fn owner_id(&self) -> &str {
        self.task_id
            .strip_suffix(CLEANUP_SUFFIX)
            .unwrap_or(&self.task_id)
    }

    pub fn start(&self) -> Minutes {
        self.span.start()
    }

    pub fn end(&self) -> Minutes {
        self.span.end()
    }

    pub fn holds(&self, equipment_id: &str) -> bool {
        self.equipment.iter().any(|id| id == equipment_id)
    }
}
