//! Scheduled timeline: ordered slots plus the derived views the rest of the
//! engine consumes (per-equipment usage, parallel groups, idle gaps).

mod slot;
mod span;

pub use slot::{TimeSlot, CLEANUP_SUFFIX};
pub use span::Span;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::units::{minutes, Minutes};
use crate::{generate_id, Id};

/// Spans held on one piece of equipment, with the share of the timeline it
/// spends occupied.
#[derive(Debug, Clone, Serialize)]
pub struct EquipmentUsage {
    pub spans: Vec<Span>,
    /// Occupied share of the total duration, in percent.
    pub utilisation: f64,
}

/// The product of a scheduling pass.
///
/// # Invariants
///
/// - `slots` sorted by start time (stable on ties)
/// - every non-cleanup task appears in exactly one slot
/// - a task's slot starts at or after the end of every dependency's slot
/// - per equipment id, concurrent non-cleanup holders never exceed its
///   concurrency
#[derive(Debug, Clone, Serialize)]
pub struct Timeline {
    pub id: Id,
    /// Wall-clock anchor for t=0; engine times are minutes from here.
    pub created_at: DateTime<Utc>,
    pub slots: Vec<TimeSlot>,
    #[serde(with = "crate::units::minute_repr")]
    pub total_duration: Minutes,
    pub equipment_usage: HashMap<Id, EquipmentUsage>,
    /// Groups of task ids whose slots overlap the group's seed slot.
    pub parallel_groups: Vec<Vec<Id>>,
    pub critical_path: Vec<Id>,
}

impl Timeline {
    /// Assembles a timeline from placed slots, deriving total duration,
    /// per-equipment usage and parallel groups.
    pub fn from_slots(mut slots: Vec<TimeSlot>, critical_path: Vec<Id>) -> Self {
        slots.sort_by(|a, b| a.start().value().total_cmp(&b.start().value()));

        let total = slots
            .iter()
            .map(|slot| slot.end().value())
            .fold(0.0_f64, f64::max);

        let mut equipment_usage: HashMap<Id, EquipmentUsage> = HashMap::new();
        for slot in &slots {
            for equipment in &slot.equipment {
                equipment_usage
                    .entry(equipment.clone())
                    .or_insert_with(|| EquipmentUsage {
                        spans: Vec::new(),
                        utilisation: 0.0,
                    })
                    .spans
                    .push(slot.span);
            }
        }
        for usage in equipment_usage.values_mut() {
            let held: f64 = usage.spans.iter().map(|span| span.duration().value()).sum();
            usage.utilisation = if total > 0.0 { held / total * 100.0 } else { 0.0 };
        }

        let parallel_groups = identify_parallel_groups(&slots);

        Self {
            id: generate_id(),
            created_at: Utc::now(),
            slots,
            total_duration: minutes(total),
            equipment_usage,
            parallel_groups,
            critical_path,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterates the non-cleanup slots in start order.
    pub fn work_slots(&self) -> impl Iterator<Item = &TimeSlot> {
        self.slots.iter().filter(|slot| !slot.is_cleanup)
    }

    /// The slot of a (non-cleanup) task.
    pub fn slot_for(&self, task_id: &str) -> Option<&TimeSlot> {
        self.work_slots().find(|slot| slot.task_id == task_id)
    }

    /// Idle gaps of at least `min_length`: timeline start to the first work
    /// slot, holes between work slots, and the tail up to the total
    /// duration. A running max-end cursor keeps overlapping parallel slots
    /// from fabricating gaps.
    pub fn idle_gaps(&self, min_length: Minutes) -> Vec<Span> {
        let mut gaps = Vec::new();
        let mut cursor = 0.0_f64;
        for slot in self.work_slots() {
            if slot.start().value() - cursor >= min_length.value() {
                gaps.push(Span::from_f64(cursor, slot.start().value()));
            }
            cursor = cursor.max(slot.end().value());
        }
        if self.total_duration.value() - cursor >= min_length.value() {
            gaps.push(Span::from_f64(cursor, self.total_duration.value()));
        }
        gaps
    }
}

/// Groups tasks whose slots run at the same time.
///
/// Slots are visited in start order; each unprocessed slot seeds a group of
/// every other unprocessed slot overlapping it. Only sets of two or more are
/// reported, and no task belongs to two groups.
fn identify_parallel_groups(slots: &[TimeSlot]) -> Vec<Vec<Id>> {
    let work: Vec<&TimeSlot> = slots.iter().filter(|slot| !slot.is_cleanup).collect();
    let mut processed = vec![false; work.len()];
    let mut groups = Vec::new();

    for seed in 0..work.len() {
        if processed[seed] {
            continue;
        }
        let mut members = vec![seed];
        for other in 0..work.len() {
            if other == seed || processed[other] {
                continue;
            }
            if work[other].span.overlaps(&work[seed].span) {
                members.push(other);
            }
        }
        if members.len() >= 2 {
            members.sort_unstable();
            for &member in &members {
                processed[member] = true;
            }
            groups.push(members.iter().map(|&m| work[m].task_id.clone()).collect());
        } else {
            processed[seed] = true;
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: &str, start: f64, end: f64, equipment: &[&str]) -> TimeSlot {
        TimeSlot::new(
            id,
            Span::from_f64(start, end),
            equipment.iter().map(|e| e.to_string()).collect(),
        )
    }

    // ── Assembly ──────────────────────────────────────────────────────

    #[test]
    fn slots_sorted_and_total_is_max_end() {
        let timeline = Timeline::from_slots(
            vec![
                slot("late", 20.0, 30.0, &["oven"]),
                slot("early", 0.0, 10.0, &["burner-1"]),
            ],
            Vec::new(),
        );
        assert_eq!(timeline.slots[0].task_id, "early");
        assert_eq!(timeline.total_duration.value(), 30.0);
    }

    #[test]
    fn empty_timeline() {
        let timeline = Timeline::from_slots(Vec::new(), Vec::new());
        assert!(timeline.is_empty());
        assert_eq!(timeline.total_duration.value(), 0.0);
        assert!(timeline.equipment_usage.is_empty());
        assert!(timeline.parallel_groups.is_empty());
    }

    // ── Usage ─────────────────────────────────────────────────────────

    #[test]
    fn utilisation_is_share_of_total() {
        let timeline = Timeline::from_slots(
            vec![
                slot("a", 0.0, 10.0, &["burner-1"]),
                slot("b", 10.0, 40.0, &["pot-large"]),
            ],
            Vec::new(),
        );
        let burner = &timeline.equipment_usage["burner-1"];
        assert_eq!(burner.spans.len(), 1);
        assert!((burner.utilisation - 25.0).abs() < 1e-9);
        assert!((timeline.equipment_usage["pot-large"].utilisation - 75.0).abs() < 1e-9);
    }

    // ── Parallel groups ───────────────────────────────────────────────

    #[test]
    fn overlapping_slots_form_one_group() {
        let timeline = Timeline::from_slots(
            vec![
                slot("simmer", 0.0, 30.0, &["pot-large"]),
                slot("chop", 5.0, 15.0, &["cutting-board-1"]),
                slot("plate", 40.0, 45.0, &["counter-main"]),
            ],
            Vec::new(),
        );
        assert_eq!(timeline.parallel_groups.len(), 1);
        assert_eq!(timeline.parallel_groups[0], vec!["simmer", "chop"]);
    }

    #[test]
    fn groups_do_not_share_members() {
        // a overlaps b, b overlaps c, but c does not overlap a: the group is
        // seeded from a, and c stays ungrouped.
        let timeline = Timeline::from_slots(
            vec![
                slot("a", 0.0, 10.0, &["burner-1"]),
                slot("b", 5.0, 20.0, &["burner-2"]),
                slot("c", 12.0, 25.0, &["burner-3"]),
            ],
            Vec::new(),
        );
        assert_eq!(timeline.parallel_groups, vec![vec!["a", "b"]]);
    }

    #[test]
    fn cleanup_slots_ignored_by_grouping() {
        let cleanup = TimeSlot::cleanup("a", Span::from_f64(0.0, 30.0), vec!["oven".into()]);
        let timeline = Timeline::from_slots(
            vec![slot("b", 0.0, 10.0, &["burner-1"]), cleanup],
            Vec::new(),
        );
        assert!(timeline.parallel_groups.is_empty());
    }

    // ── Gaps ──────────────────────────────────────────────────────────

    #[test]
    fn idle_gaps_found_between_slots() {
        let timeline = Timeline::from_slots(
            vec![
                slot("a", 5.0, 10.0, &["burner-1"]),
                slot("b", 20.0, 30.0, &["oven"]),
            ],
            Vec::new(),
        );
        let gaps = timeline.idle_gaps(minutes(2.0));
        assert_eq!(gaps.len(), 2);
        assert_eq!(gaps[0], Span::from_f64(0.0, 5.0));
        assert_eq!(gaps[1], Span::from_f64(10.0, 20.0));
    }

    #[test]
    fn short_gaps_discarded() {
        let timeline = Timeline::from_slots(
            vec![
                slot("a", 0.0, 10.0, &["burner-1"]),
                slot("b", 11.0, 20.0, &["oven"]),
            ],
            Vec::new(),
        );
        assert!(timeline.idle_gaps(minutes(2.0)).is_empty());
    }

    #[test]
    fn parallel_slots_do_not_fabricate_gaps() {
        // b ends before a does; the cursor stays at a's end, so there is no
        // phantom gap between b.end and c.start.
        let timeline = Timeline::from_slots(
            vec![
                slot("a", 0.0, 30.0, &["pot-large"]),
                slot("b", 0.0, 10.0, &["cutting-board-1"]),
                slot("c", 30.0, 35.0, &["counter-main"]),
            ],
            Vec::new(),
        );
        assert!(timeline.idle_gaps(minutes(2.0)).is_empty());
    }

    #[test]
    fn tail_gap_up_to_total_duration() {
        // Cleanup slot stretches the total; the tail after the last work
        // slot is idle.
        let cleanup = TimeSlot::cleanup("a", Span::from_f64(10.0, 14.0), vec!["oven".into()]);
        let timeline = Timeline::from_slots(vec![slot("a", 0.0, 10.0, &["oven"]), cleanup], Vec::new());
        let gaps = timeline.idle_gaps(minutes(2.0));
        assert_eq!(gaps, vec![Span::from_f64(10.0, 14.0)]);
    }
}
