//! Cleanup planning: turns a finished timeline into a cleaning plan with
//! dishwasher loads, handwash batches and clean-as-you-go assignments.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::PlannerConfig;
use crate::equipment::{EquipmentCategory, EquipmentRegistry};
use crate::task::Priority;
use crate::timeline::Timeline;
use crate::units::{minutes, Minutes};
use crate::{generate_id, Id};

/// Items per dishwasher load.
pub const DISHWASHER_LOAD_CAPACITY: usize = 12;
/// Handwash tasks within this many minutes of a batch anchor share a trip to
/// the sink.
pub const HANDWASH_BATCH_WINDOW_MINUTES: f64 = 10.0;
/// Gaps shorter than this are not worth walking to the sink for.
const MIN_USEFUL_GAP_MINUTES: f64 = 2.0;
/// Minutes to load one dishwasher run; the machine itself runs unattended.
const DISHWASHER_LOAD_MINUTES: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleaningMethod {
    Handwash,
    Dishwasher,
    Soak,
    Wipe,
}

/// One piece of equipment to clean once its last task ends.
#[derive(Debug, Clone, Serialize)]
pub struct CleaningTask {
    pub id: Id,
    pub equipment_id: Id,
    pub equipment_name: String,
    pub method: CleaningMethod,
    #[serde(with = "crate::units::minute_repr")]
    pub duration: Minutes,
    #[serde(with = "crate::units::minute_repr")]
    pub scheduled_at: Minutes,
    pub can_batch: bool,
    pub priority: Priority,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CleaningPlan {
    /// Every cleaning task, at its original per-equipment time.
    pub tasks: Vec<CleaningTask>,
    pub dishwasher_loads: Vec<Vec<CleaningTask>>,
    pub handwash_batches: Vec<Vec<CleaningTask>>,
    /// Re-timed copies placed into idle timeline gaps.
    pub clean_as_you_go: Vec<CleaningTask>,
    #[serde(with = "crate::units::minute_repr")]
    pub total_time: Minutes,
}

impl CleaningPlan {
    /// One-line summaries for the plan overview.
    pub fn suggestions(&self) -> Vec<String> {
        let mut suggestions = Vec::new();
        if !self.dishwasher_loads.is_empty() {
            suggestions.push(format!(
                "Load the dishwasher {} time(s); it runs while you cook",
                self.dishwasher_loads.len()
            ));
        }
        if !self.clean_as_you_go.is_empty() {
            suggestions.push(format!(
                "{} cleanups fit into idle gaps; do them as you go",
                self.clean_as_you_go.len()
            ));
        }
        if !self.tasks.is_empty() {
            suggestions.push(format!(
                "Budget about {:.0} min of hands-on cleaning",
                self.total_time.value()
            ));
        }
        suggestions
    }
}

/// Nominal method and duration for well-known equipment. Prefix rules cover
/// the numbered ids (burners, racks, boards, counters, sheet pans).
fn table_entry(equipment_id: &str) -> Option<(CleaningMethod, f64)> {
    if equipment_id.starts_with("cutting-board-") {
        return Some((CleaningMethod::Handwash, 2.0));
    }
    if equipment_id.starts_with("counter-") {
        return Some((CleaningMethod::Wipe, 2.0));
    }
    if equipment_id.starts_with("oven-rack-") {
        return Some((CleaningMethod::Soak, 15.0));
    }
    if equipment_id.starts_with("burner-") {
        return Some((CleaningMethod::Wipe, 2.0));
    }
    if equipment_id.starts_with("sheet-pan-") {
        return Some((CleaningMethod::Dishwasher, 3.0));
    }
    match equipment_id {
        "pot-large" => Some((CleaningMethod::Handwash, 5.0)),
        "pot-medium" => Some((CleaningMethod::Handwash, 4.0)),
        "pot-small" => Some((CleaningMethod::Handwash, 3.0)),
        "baking-dish" => Some((CleaningMethod::Soak, 10.0)),
        "instant-pot" => Some((CleaningMethod::Handwash, 8.0)),
        "dutch-oven" => Some((CleaningMethod::Handwash, 6.0)),
        "skillet-large" | "skillet-medium" => Some((CleaningMethod::Handwash, 4.0)),
        "wok" => Some((CleaningMethod::Handwash, 5.0)),
        "oven" => Some((CleaningMethod::Wipe, 5.0)),
        "microwave" => Some((CleaningMethod::Wipe, 3.0)),
        "mixing-bowl-large" | "mixing-bowl-medium" => Some((CleaningMethod::Dishwasher, 2.0)),
        "colander" | "strainer" => Some((CleaningMethod::Dishwasher, 2.0)),
        "blender" | "food-processor" => Some((CleaningMethod::Handwash, 4.0)),
        "rice-cooker" | "air-fryer" => Some((CleaningMethod::Handwash, 4.0)),
        _ => None,
    }
}

fn priority_for(method: CleaningMethod, category: Option<EquipmentCategory>) -> Priority {
    if method == CleaningMethod::Soak {
        return Priority::High;
    }
    match category {
        Some(EquipmentCategory::Surface) => Priority::High,
        Some(EquipmentCategory::Tool) => Priority::Medium,
        _ => Priority::Low,
    }
}

fn note_for(method: CleaningMethod, category: Option<EquipmentCategory>) -> String {
    match (method, category) {
        (CleaningMethod::Soak, _) => "Fill with hot soapy water and leave it; scrub later".into(),
        (CleaningMethod::Wipe, Some(EquipmentCategory::Surface)) => {
            "Clear, wipe and sanitise before the next prep lands here".into()
        }
        (CleaningMethod::Wipe, _) => "Wipe down while still warm; burnt-on splatter sets fast".into(),
        (CleaningMethod::Dishwasher, _) => "Dishwasher-safe; stack it in the next load".into(),
        (CleaningMethod::Handwash, Some(EquipmentCategory::Tool)) => {
            "Wash, rinse and stand to air-dry".into()
        }
        (CleaningMethod::Handwash, _) => "Handwash only; do not submerge the base".into(),
    }
}

/// Builds the cleaning plan for a scheduled timeline.
///
/// Each equipment id touched by a work slot gets one task at the end of its
/// last slot. Ids absent from the static table fall back to the configured
/// method and the registry's cleaning time; ids absent from the registry as
/// well are skipped (nothing is known about them).
pub fn build_plan(
    timeline: &Timeline,
    registry: &EquipmentRegistry,
    config: &PlannerConfig,
) -> CleaningPlan {
    let mut first_seen: Vec<Id> = Vec::new();
    let mut last_end: HashMap<Id, f64> = HashMap::new();
    for slot in timeline.work_slots() {
        for equipment in &slot.equipment {
            let end = slot.end().value();
            match last_end.get(equipment).copied() {
                Some(known) if known >= end => {}
                Some(_) => {
                    last_end.insert(equipment.clone(), end);
                }
                None => {
                    first_seen.push(equipment.clone());
                    last_end.insert(equipment.clone(), end);
                }
            }
        }
    }

    let mut tasks = Vec::new();
    for equipment_id in first_seen {
        let entry = registry.get(&equipment_id);
        let (method, duration) = match table_entry(&equipment_id) {
            Some((method, nominal)) => (method, minutes(nominal)),
            None => match entry {
                Some(item) => (config.preferred_cleaning_method, item.cleaning_time),
                None => continue,
            },
        };
        let category = entry.map(|item| item.category);
        tasks.push(CleaningTask {
            id: generate_id(),
            equipment_name: entry
                .map(|item| item.name.clone())
                .unwrap_or_else(|| equipment_id.clone()),
            scheduled_at: minutes(last_end[&equipment_id]),
            equipment_id,
            method,
            duration,
            can_batch: matches!(method, CleaningMethod::Handwash | CleaningMethod::Dishwasher),
            priority: priority_for(method, category),
            notes: note_for(method, category),
        });
    }

    let dishwasher_loads = pack_dishwasher_loads(&tasks);
    let handwash_batches = batch_handwash(&tasks);
    let clean_as_you_go = fill_idle_gaps(&tasks, timeline);
    let total_time = total_cleaning_time(
        &tasks,
        dishwasher_loads.len(),
        config.handwash_batch_efficiency,
    );

    CleaningPlan {
        tasks,
        dishwasher_loads,
        handwash_batches,
        clean_as_you_go,
        total_time,
    }
}

/// Partitions dishwasher-method tasks into successive loads.
pub fn pack_dishwasher_loads(tasks: &[CleaningTask]) -> Vec<Vec<CleaningTask>> {
    let machine_bound: Vec<&CleaningTask> = tasks
        .iter()
        .filter(|task| task.method == CleaningMethod::Dishwasher)
        .collect();
    machine_bound
        .chunks(DISHWASHER_LOAD_CAPACITY)
        .map(|load| load.iter().map(|&task| task.clone()).collect())
        .collect()
}

/// Groups handwash tasks whose scheduled times fall within the batch window
/// of the batch's first (anchor) task.
pub fn batch_handwash(tasks: &[CleaningTask]) -> Vec<Vec<CleaningTask>> {
    let mut sink_bound: Vec<&CleaningTask> = tasks
        .iter()
        .filter(|task| task.method == CleaningMethod::Handwash)
        .collect();
    sink_bound.sort_by(|a, b| a.scheduled_at.value().total_cmp(&b.scheduled_at.value()));

    let mut batches: Vec<Vec<CleaningTask>> = Vec::new();
    let mut anchor = f64::NEG_INFINITY;
    for task in sink_bound {
        let at = task.scheduled_at.value();
        match batches.last_mut() {
            Some(batch) if at - anchor <= HANDWASH_BATCH_WINDOW_MINUTES => {
                batch.push(task.clone());
            }
            _ => {
                anchor = at;
                batches.push(vec![task.clone()]);
            }
        }
    }
    batches
}

/// Packs cleaning work into idle timeline gaps, most urgent and shortest
/// first. A task is only placed at or after its original time, never before
/// the equipment is actually free.
fn fill_idle_gaps(tasks: &[CleaningTask], timeline: &Timeline) -> Vec<CleaningTask> {
    let mut gaps = timeline.idle_gaps(minutes(MIN_USEFUL_GAP_MINUTES));

    let mut ordered: Vec<&CleaningTask> = tasks.iter().collect();
    ordered.sort_by(|a, b| {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then(a.duration.value().total_cmp(&b.duration.value()))
    });

    let mut placed = Vec::new();
    for task in ordered {
        let fitting = gaps.iter_mut().find(|gap| {
            gap.start().value() >= task.scheduled_at.value()
                && gap.duration().value() >= task.duration.value()
        });
        if let Some(gap) = fitting {
            let start = gap.start();
            let mut assignment = task.clone();
            assignment.scheduled_at = start;
            placed.push(assignment);
            // Shrink the gap from its head.
            *gap = crate::timeline::Span::new(
                minutes(start.value() + task.duration.value()),
                gap.end(),
            );
        }
    }
    placed
}

/// Dishwasher loads cost loading time only; batched handwashing is
/// discounted; soaks and wipes count in full. Rounded up to whole minutes.
fn total_cleaning_time(tasks: &[CleaningTask], loads: usize, handwash_efficiency: f64) -> Minutes {
    let handwash: f64 = tasks
        .iter()
        .filter(|task| task.method == CleaningMethod::Handwash)
        .map(|task| task.duration.value())
        .sum();
    let unbatched: f64 = tasks
        .iter()
        .filter(|task| {
            matches!(task.method, CleaningMethod::Soak | CleaningMethod::Wipe)
        })
        .map(|task| task.duration.value())
        .sum();
    let total = loads as f64 * DISHWASHER_LOAD_MINUTES + handwash_efficiency * handwash + unbatched;
    minutes(total.ceil())
}
