//! Four independent sweep-line passes over a scheduled timeline.

use std::collections::HashMap;

use super::{Conflict, ConflictKind, Severity};
use crate::config::PlannerConfig;
use crate::equipment::EquipmentRegistry;
use crate::task::PrepTask;
use crate::timeline::{Span, TimeSlot, Timeline};
use crate::{generate_id, Id};

/// Pooled oven capacity: the cavity takes two racks' worth of dishes no
/// matter which rack ids the tasks name.
const OVEN_POOL_CAPACITY: usize = 2;
/// Pooled stovetop capacity: four burners.
const BURNER_POOL_CAPACITY: usize = 4;

/// Runs every detection pass. Cleanup slots are never analysed.
pub fn detect_conflicts(
    timeline: &Timeline,
    tasks: &[PrepTask],
    registry: &EquipmentRegistry,
    config: &PlannerConfig,
) -> Vec<Conflict> {
    let by_id: HashMap<&str, &PrepTask> =
        tasks.iter().map(|task| (task.id.as_str(), task)).collect();

    let mut conflicts = Vec::new();
    equipment_overlaps(&mut conflicts, timeline, registry);
    pooled_slot_excess(&mut conflicts, timeline);
    dependency_violations(&mut conflicts, timeline, &by_id);
    attention_overloads(&mut conflicts, timeline, &by_id, config.attention_threshold);
    conflicts
}

/// Sweep events over a set of slots: (time, +1 start / -1 end, slot index),
/// sorted by time with ends released before starts.
fn sweep_events(slots: &[&TimeSlot]) -> Vec<(f64, i32, usize)> {
    let mut events: Vec<(f64, i32, usize)> = slots
        .iter()
        .enumerate()
        .flat_map(|(index, slot)| {
            [
                (slot.start().value(), 1, index),
                (slot.end().value(), -1, index),
            ]
        })
        .collect();
    events.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    events
}

/// Collects each active set at the moment the sweep first climbs past
/// `capacity`, together with the peak active set of the whole sweep.
fn over_capacity_sets(slots: &[&TimeSlot], capacity: usize) -> (Vec<Vec<usize>>, Vec<usize>) {
    let mut active: Vec<usize> = Vec::new();
    let mut crossings = Vec::new();
    let mut peak: Vec<usize> = Vec::new();
    for (_, delta, index) in sweep_events(slots) {
        if delta > 0 {
            active.push(index);
            if active.len() == capacity + 1 {
                crossings.push(active.clone());
            }
            if active.len() > peak.len() {
                peak = active.clone();
            }
        } else {
            active.retain(|&held| held != index);
        }
    }
    (crossings, peak)
}

/// Range covered by a set of slots: earliest start to latest end.
fn covering_span(slots: &[&TimeSlot], members: &[usize]) -> Span {
    let start = members
        .iter()
        .map(|&m| slots[m].start().value())
        .fold(f64::INFINITY, f64::min);
    let end = members
        .iter()
        .map(|&m| slots[m].end().value())
        .fold(0.0_f64, f64::max);
    Span::from_f64(start, end)
}

fn member_ids(slots: &[&TimeSlot], members: &[usize]) -> Vec<Id> {
    members.iter().map(|&m| slots[m].task_id.clone()).collect()
}

/// Per-equipment capacity sweep. One critical conflict per upward crossing.
fn equipment_overlaps(out: &mut Vec<Conflict>, timeline: &Timeline, registry: &EquipmentRegistry) {
    let mut equipment_ids: Vec<&Id> = timeline.equipment_usage.keys().collect();
    equipment_ids.sort();

    for equipment in equipment_ids {
        let holders: Vec<&TimeSlot> = timeline
            .work_slots()
            .filter(|slot| slot.holds(equipment))
            .collect();
        let capacity = registry.concurrency(equipment) as usize;
        let (crossings, _) = over_capacity_sets(&holders, capacity);
        for members in crossings {
            let ids = member_ids(&holders, &members);
            out.push(Conflict {
                id: generate_id(),
                kind: ConflictKind::EquipmentOverlap,
                description: format!(
                    "{} tasks need {} at once (capacity {}): {}",
                    ids.len(),
                    equipment,
                    capacity,
                    ids.join(", ")
                ),
                tasks: ids,
                equipment: Some(equipment.clone()),
                span: covering_span(&holders, &members),
                severity: Severity::Critical,
            });
        }
    }
}

fn oven_family(id: &str) -> bool {
    id == "oven" || id.starts_with("oven-rack")
}

fn burner_family(id: &str) -> bool {
    id.starts_with("burner")
}

/// Pooled-capacity sweep over the oven and burner families. At most one
/// conflict per family, reported at the peak-usage instant.
fn pooled_slot_excess(out: &mut Vec<Conflict>, timeline: &Timeline) {
    let pools: [(&str, fn(&str) -> bool, usize); 2] = [
        ("oven", oven_family, OVEN_POOL_CAPACITY),
        ("stovetop", burner_family, BURNER_POOL_CAPACITY),
    ];

    for (label, in_family, capacity) in pools {
        let holders: Vec<&TimeSlot> = timeline
            .work_slots()
            .filter(|slot| slot.equipment.iter().any(|id| in_family(id)))
            .collect();
        let (_, peak) = over_capacity_sets(&holders, capacity);
        if peak.len() > capacity {
            let ids = member_ids(&holders, &peak);
            out.push(Conflict {
                id: generate_id(),
                kind: ConflictKind::SlotExceeded,
                description: format!(
                    "{} {} dishes in flight but only {} slots: {}",
                    peak.len(),
                    label,
                    capacity,
                    ids.join(", ")
                ),
                tasks: ids,
                equipment: Some(label.to_string()),
                span: covering_span(&holders, &peak),
                severity: Severity::Critical,
            });
        }
    }
}

/// Flags every slot that starts before one of its dependencies ends.
fn dependency_violations(
    out: &mut Vec<Conflict>,
    timeline: &Timeline,
    by_id: &HashMap<&str, &PrepTask>,
) {
    for slot in timeline.work_slots() {
        let Some(task) = by_id.get(slot.task_id.as_str()) else {
            continue;
        };
        for dependency in &task.dependencies {
            let Some(dep_slot) = timeline.slot_for(dependency) else {
                continue;
            };
            if dep_slot.end().value() > slot.start().value() {
                out.push(Conflict {
                    id: generate_id(),
                    kind: ConflictKind::DependencyViolation,
                    tasks: vec![slot.task_id.clone(), dependency.clone()],
                    equipment: None,
                    span: Span::new(slot.start(), dep_slot.end()),
                    severity: Severity::Critical,
                    description: format!(
                        "{} starts at {:.0} before its prerequisite {} finishes at {:.0}",
                        slot.task_id,
                        slot.start().value(),
                        dependency,
                        dep_slot.end().value()
                    ),
                });
            }
        }
    }
}

/// Sweeps the attention-demanding slots against the operator threshold.
fn attention_overloads(
    out: &mut Vec<Conflict>,
    timeline: &Timeline,
    by_id: &HashMap<&str, &PrepTask>,
    threshold: usize,
) {
    let demanding: Vec<&TimeSlot> = timeline
        .work_slots()
        .filter(|slot| {
            by_id
                .get(slot.task_id.as_str())
                .is_some_and(|task| task.requires_attention)
        })
        .collect();
    let (crossings, _) = over_capacity_sets(&demanding, threshold);
    for members in crossings {
        let ids = member_ids(&demanding, &members);
        out.push(Conflict {
            id: generate_id(),
            kind: ConflictKind::AttentionOverload,
            description: format!(
                "{} tasks demand attention at once (limit {}): {}",
                ids.len(),
                threshold,
                ids.join(", ")
            ),
            tasks: ids,
            equipment: None,
            span: covering_span(&demanding, &members),
            severity: Severity::Warning,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskType;
    use crate::test_utils::task;

    fn slot(id: &str, start: f64, end: f64, equipment: &[&str]) -> TimeSlot {
        TimeSlot::new(
            id,
            Span::from_f64(start, end),
            equipment.iter().map(|e| e.to_string()).collect(),
        )
    }

    fn detect(slots: Vec<TimeSlot>, tasks: Vec<PrepTask>) -> Vec<Conflict> {
        let timeline = Timeline::from_slots(slots, Vec::new());
        detect_conflicts(
            &timeline,
            &tasks,
            &EquipmentRegistry::new(),
            &PlannerConfig::default(),
        )
    }

    fn of_kind(conflicts: &[Conflict], kind: ConflictKind) -> Vec<&Conflict> {
        conflicts.iter().filter(|c| c.kind == kind).collect()
    }

    // ── Equipment overlap ─────────────────────────────────────────────

    #[test]
    fn overlapping_holders_of_exclusive_equipment_conflict() {
        let conflicts = detect(
            vec![
                slot("a", 0.0, 10.0, &["burner-1"]),
                slot("b", 5.0, 15.0, &["burner-1"]),
            ],
            vec![
                task("a", TaskType::Cook, 10.0, &["burner-1"]),
                task("b", TaskType::Cook, 10.0, &["burner-1"]),
            ],
        );
        let overlaps = of_kind(&conflicts, ConflictKind::EquipmentOverlap);
        assert_eq!(overlaps.len(), 1);
        let conflict = overlaps[0];
        assert_eq!(conflict.equipment.as_deref(), Some("burner-1"));
        assert_eq!(conflict.tasks, vec!["a", "b"]);
        assert_eq!(conflict.severity, Severity::Critical);
        assert_eq!(conflict.span, Span::from_f64(0.0, 15.0));
    }

    #[test]
    fn back_to_back_holders_do_not_conflict() {
        let conflicts = detect(
            vec![
                slot("a", 0.0, 10.0, &["burner-1"]),
                slot("b", 10.0, 20.0, &["burner-1"]),
            ],
            vec![
                task("a", TaskType::Cook, 10.0, &["burner-1"]),
                task("b", TaskType::Cook, 10.0, &["burner-1"]),
            ],
        );
        assert!(of_kind(&conflicts, ConflictKind::EquipmentOverlap).is_empty());
    }

    #[test]
    fn multi_slot_equipment_tolerates_capacity() {
        let conflicts = detect(
            vec![
                slot("a", 0.0, 20.0, &["oven"]),
                slot("b", 0.0, 20.0, &["oven"]),
            ],
            vec![
                task("a", TaskType::Bake, 20.0, &["oven"]),
                task("b", TaskType::Bake, 20.0, &["oven"]),
            ],
        );
        assert!(of_kind(&conflicts, ConflictKind::EquipmentOverlap).is_empty());
    }

    #[test]
    fn cleanup_slots_are_ignored() {
        let cleanup = TimeSlot::cleanup("a", Span::from_f64(0.0, 10.0), vec!["burner-1".into()]);
        let conflicts = detect(
            vec![slot("b", 0.0, 10.0, &["burner-1"]), cleanup],
            vec![task("b", TaskType::Cook, 10.0, &["burner-1"])],
        );
        assert!(of_kind(&conflicts, ConflictKind::EquipmentOverlap).is_empty());
    }

    // ── Pooled slot capacity ──────────────────────────────────────────

    #[test]
    fn oven_pool_overflow_reports_peak() {
        let conflicts = detect(
            vec![
                slot("a", 0.0, 20.0, &["oven"]),
                slot("b", 0.0, 20.0, &["oven"]),
                slot("c", 5.0, 25.0, &["oven-rack-1"]),
            ],
            vec![
                task("a", TaskType::Bake, 20.0, &["oven"]),
                task("b", TaskType::Bake, 20.0, &["oven"]),
                task("c", TaskType::Bake, 20.0, &["oven-rack-1"]),
            ],
        );
        let pooled = of_kind(&conflicts, ConflictKind::SlotExceeded);
        assert_eq!(pooled.len(), 1);
        let conflict = pooled[0];
        assert_eq!(conflict.equipment.as_deref(), Some("oven"));
        assert_eq!(conflict.tasks.len(), 3);
        assert!(conflict.tasks.contains(&"c".to_string()));
    }

    #[test]
    fn burner_pool_overflow_labelled_stovetop() {
        let burners = ["burner-1", "burner-2", "burner-3", "burner-4", "burner-1"];
        let slots = burners
            .into_iter()
            .enumerate()
            .map(|(i, burner)| slot(&format!("t{i}"), 0.0, 10.0, &[burner]))
            .collect();
        let tasks = (0..5)
            .map(|i| task(&format!("t{i}"), TaskType::Cook, 10.0, &["burner-1"]))
            .collect();
        let conflicts = detect(slots, tasks);
        let pooled = of_kind(&conflicts, ConflictKind::SlotExceeded);
        assert_eq!(pooled.len(), 1);
        assert_eq!(pooled[0].equipment.as_deref(), Some("stovetop"));
    }

    #[test]
    fn pool_within_capacity_is_quiet() {
        let conflicts = detect(
            vec![
                slot("a", 0.0, 20.0, &["oven"]),
                slot("b", 20.0, 40.0, &["oven"]),
                slot("c", 40.0, 60.0, &["oven"]),
            ],
            vec![
                task("a", TaskType::Bake, 20.0, &["oven"]),
                task("b", TaskType::Bake, 20.0, &["oven"]),
                task("c", TaskType::Bake, 20.0, &["oven"]),
            ],
        );
        assert!(of_kind(&conflicts, ConflictKind::SlotExceeded).is_empty());
    }

    // ── Dependency violations ─────────────────────────────────────────

    #[test]
    fn early_start_violates_dependency() {
        let conflicts = detect(
            vec![
                slot("chop", 0.0, 10.0, &["cutting-board-1"]),
                slot("saute", 5.0, 15.0, &["skillet-large"]),
            ],
            vec![
                task("chop", TaskType::Prep, 10.0, &["cutting-board-1"]),
                task("saute", TaskType::Cook, 10.0, &["skillet-large"])
                    .with_dependencies(["chop"]),
            ],
        );
        let violations = of_kind(&conflicts, ConflictKind::DependencyViolation);
        assert_eq!(violations.len(), 1);
        let conflict = violations[0];
        assert_eq!(conflict.tasks, vec!["saute", "chop"]);
        assert_eq!(conflict.span, Span::from_f64(5.0, 10.0));
    }

    #[test]
    fn satisfied_dependency_is_quiet() {
        let conflicts = detect(
            vec![
                slot("chop", 0.0, 10.0, &["cutting-board-1"]),
                slot("saute", 10.0, 20.0, &["skillet-large"]),
            ],
            vec![
                task("chop", TaskType::Prep, 10.0, &["cutting-board-1"]),
                task("saute", TaskType::Cook, 10.0, &["skillet-large"])
                    .with_dependencies(["chop"]),
            ],
        );
        assert!(of_kind(&conflicts, ConflictKind::DependencyViolation).is_empty());
    }

    // ── Attention overload ────────────────────────────────────────────

    #[test]
    fn three_demanding_tasks_overload_default_threshold() {
        let conflicts = detect(
            vec![
                slot("a", 0.0, 10.0, &["burner-1"]),
                slot("b", 0.0, 10.0, &["burner-2"]),
                slot("c", 5.0, 15.0, &["burner-3"]),
            ],
            vec![
                task("a", TaskType::Cook, 10.0, &["burner-1"]).with_attention(true),
                task("b", TaskType::Cook, 10.0, &["burner-2"]).with_attention(true),
                task("c", TaskType::Cook, 10.0, &["burner-3"]).with_attention(true),
            ],
        );
        let overloads = of_kind(&conflicts, ConflictKind::AttentionOverload);
        assert_eq!(overloads.len(), 1);
        assert_eq!(overloads[0].severity, Severity::Warning);
        assert_eq!(overloads[0].tasks.len(), 3);
    }

    #[test]
    fn hands_off_tasks_do_not_count() {
        let conflicts = detect(
            vec![
                slot("a", 0.0, 10.0, &["burner-1"]),
                slot("b", 0.0, 10.0, &["burner-2"]),
                slot("c", 0.0, 30.0, &["pot-large"]),
            ],
            vec![
                task("a", TaskType::Cook, 10.0, &["burner-1"]).with_attention(true),
                task("b", TaskType::Cook, 10.0, &["burner-2"]).with_attention(true),
                task("c", TaskType::Simmer, 30.0, &["pot-large"]),
            ],
        );
        assert!(of_kind(&conflicts, ConflictKind::AttentionOverload).is_empty());
    }
}
