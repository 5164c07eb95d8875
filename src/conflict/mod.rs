//! Conflict detection and resolution.
//!
//! Detection is pure analysis over a timeline; resolution maps each conflict
//! kind to a repair strategy. Anything the resolver cannot repair becomes a
//! `Manual` resolution with advice, never an error.

mod detector;
mod resolver;

pub use detector::detect_conflicts;
pub use resolver::resolve_conflicts;

use serde::Serialize;

use crate::timeline::{Span, TimeSlot};
use crate::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// More concurrent holders than one equipment id can host.
    EquipmentOverlap,
    /// A pooled resource family (oven racks, burners) oversubscribed.
    SlotExceeded,
    /// A task starts before one of its dependencies ends.
    DependencyViolation,
    /// More attention-demanding tasks than the operator can juggle.
    AttentionOverload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
}

#[derive(Debug, Clone, Serialize)]
pub struct Conflict {
    pub id: Id,
    pub kind: ConflictKind,
    /// Tasks involved at the moment of the violation.
    pub tasks: Vec<Id>,
    /// The implicated equipment id, or the resource label (`oven`,
    /// `stovetop`) for pooled-capacity conflicts.
    pub equipment: Option<Id>,
    pub span: Span,
    pub severity: Severity,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionStrategy {
    /// Swap the contested equipment for a clean alternative.
    Substitute,
    /// Move one task to a later start.
    Reschedule,
    /// Run the overflow strictly back to back.
    Sequential,
    /// Stagger starts so attention never piles up.
    Split,
    /// Nothing mechanical applies; the cook decides.
    Manual,
}

#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub conflict_id: Id,
    pub strategy: ResolutionStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitute: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement_slots: Option<Vec<TimeSlot>>,
    pub explanation: String,
}

impl Resolution {
    pub fn is_manual(&self) -> bool {
        self.strategy == ResolutionStrategy::Manual
    }
}
