//! Strategy selection: one resolution per detected conflict.

use std::collections::HashMap;

use super::{Conflict, ConflictKind, Resolution, ResolutionStrategy};
use crate::equipment::EquipmentRegistry;
use crate::task::PrepTask;
use crate::timeline::{Span, TimeSlot};
use crate::units::minutes;

/// Oven-family tasks kept in place before the rest go sequential.
const OVEN_KEEP: usize = 2;
/// Burner-family tasks kept in place.
const BURNER_KEEP: usize = 4;
/// Stagger step for split resolutions.
const SPLIT_STAGGER_MINUTES: f64 = 5.0;

/// Resolves every conflict. A conflict the resolver cannot repair becomes a
/// `Manual` resolution with advice rather than an error.
pub fn resolve_conflicts(
    conflicts: &[Conflict],
    tasks: &[PrepTask],
    registry: &EquipmentRegistry,
) -> Vec<Resolution> {
    let by_id: HashMap<&str, &PrepTask> =
        tasks.iter().map(|task| (task.id.as_str(), task)).collect();
    conflicts
        .iter()
        .map(|conflict| resolve(conflict, &by_id, registry))
        .collect()
}

fn resolve(
    conflict: &Conflict,
    by_id: &HashMap<&str, &PrepTask>,
    registry: &EquipmentRegistry,
) -> Resolution {
    match conflict.kind {
        ConflictKind::EquipmentOverlap => resolve_equipment_overlap(conflict, by_id, registry),
        ConflictKind::SlotExceeded => resolve_slot_excess(conflict, by_id),
        ConflictKind::DependencyViolation => resolve_dependency_violation(conflict, by_id),
        ConflictKind::AttentionOverload => resolve_attention_overload(conflict, by_id),
    }
}

fn manual(conflict: &Conflict, explanation: impl Into<String>) -> Resolution {
    Resolution {
        conflict_id: conflict.id.clone(),
        strategy: ResolutionStrategy::Manual,
        substitute: None,
        replacement_slots: None,
        explanation: explanation.into(),
    }
}

/// Involved tasks resolved against the task set, priority-sorted (critical
/// first, input order on ties).
fn involved<'a>(conflict: &Conflict, by_id: &HashMap<&str, &'a PrepTask>) -> Vec<&'a PrepTask> {
    let mut found: Vec<&PrepTask> = conflict
        .tasks
        .iter()
        .filter_map(|id| by_id.get(id.as_str()).copied())
        .collect();
    found.sort_by_key(|task| task.priority.rank());
    found
}

fn resolve_equipment_overlap(
    conflict: &Conflict,
    by_id: &HashMap<&str, &PrepTask>,
    registry: &EquipmentRegistry,
) -> Resolution {
    if let Some(equipment) = &conflict.equipment {
        if let Some(alternative) = registry.clean_alternative(equipment) {
            return Resolution {
                conflict_id: conflict.id.clone(),
                strategy: ResolutionStrategy::Substitute,
                substitute: Some(alternative.id.clone()),
                replacement_slots: None,
                explanation: format!(
                    "Move one dish from {} to the clean {}",
                    equipment, alternative.name
                ),
            };
        }
    }

    let ranked = involved(conflict, by_id);
    match ranked.last() {
        Some(victim) => {
            let start = conflict.span.end();
            let slot = TimeSlot::new(
                victim.id.clone(),
                Span::new(start, start + victim.duration),
                victim.equipment.clone(),
            );
            Resolution {
                conflict_id: conflict.id.clone(),
                strategy: ResolutionStrategy::Reschedule,
                substitute: None,
                explanation: format!(
                    "No clean alternative; push lowest-priority {} to {:.0}",
                    victim.name,
                    start.value()
                ),
                replacement_slots: Some(vec![slot]),
            }
        }
        None => manual(conflict, "No substitute or reschedule candidate available"),
    }
}

fn resolve_slot_excess(conflict: &Conflict, by_id: &HashMap<&str, &PrepTask>) -> Resolution {
    let keep = match conflict.equipment.as_deref() {
        Some("oven") => OVEN_KEEP,
        _ => BURNER_KEEP,
    };
    let ranked = involved(conflict, by_id);
    if ranked.len() <= keep {
        return manual(
            conflict,
            "Overflow tasks could not be matched against the task set",
        );
    }

    let mut cursor = conflict.span.end();
    let mut slots = Vec::new();
    for task in &ranked[keep..] {
        let slot = TimeSlot::new(
            task.id.clone(),
            Span::new(cursor, cursor + task.duration),
            task.equipment.clone(),
        );
        cursor = slot.end();
        slots.push(slot);
    }
    let moved: Vec<&str> = slots.iter().map(|slot| slot.task_id.as_str()).collect();
    Resolution {
        conflict_id: conflict.id.clone(),
        strategy: ResolutionStrategy::Sequential,
        substitute: None,
        explanation: format!(
            "Keep the top {} dishes in place and run {} back to back afterwards",
            keep,
            moved.join(", ")
        ),
        replacement_slots: Some(slots),
    }
}

fn resolve_dependency_violation(
    conflict: &Conflict,
    by_id: &HashMap<&str, &PrepTask>,
) -> Resolution {
    // Detector convention: tasks[0] is the dependent, tasks[1] the
    // prerequisite; the conflict span ends where the prerequisite finishes.
    let dependent = conflict
        .tasks
        .first()
        .and_then(|id| by_id.get(id.as_str()).copied());
    match dependent {
        Some(dependent) => {
            let start = conflict.span.end();
            let slot = TimeSlot::new(
                dependent.id.clone(),
                Span::new(start, start + dependent.duration),
                dependent.equipment.clone(),
            );
            Resolution {
                conflict_id: conflict.id.clone(),
                strategy: ResolutionStrategy::Reschedule,
                substitute: None,
                explanation: format!(
                    "Hold {} until its prerequisite finishes at {:.0}",
                    dependent.name,
                    start.value()
                ),
                replacement_slots: Some(vec![slot]),
            }
        }
        None => manual(conflict, "Dependent task missing from the task set"),
    }
}

fn resolve_attention_overload(
    conflict: &Conflict,
    by_id: &HashMap<&str, &PrepTask>,
) -> Resolution {
    let ranked = involved(conflict, by_id);
    let hands_off: Vec<&str> = ranked
        .iter()
        .filter(|task| task.task_type.is_hands_off())
        .map(|task| task.name.as_str())
        .collect();
    if !hands_off.is_empty() {
        return manual(
            conflict,
            format!(
                "Treat {} as passive once started; they only need spot checks",
                hands_off.join(", ")
            ),
        );
    }

    let mut slots = Vec::new();
    for (offset, task) in ranked.iter().enumerate() {
        let start = minutes(conflict.span.start().value() + offset as f64 * SPLIT_STAGGER_MINUTES);
        slots.push(TimeSlot::new(
            task.id.clone(),
            Span::new(start, start + task.duration),
            task.equipment.clone(),
        ));
    }
    Resolution {
        conflict_id: conflict.id.clone(),
        strategy: ResolutionStrategy::Split,
        substitute: None,
        explanation: "Stagger the starts so only part of the work demands attention at once"
            .to_string(),
        replacement_slots: Some(slots),
    }
}
