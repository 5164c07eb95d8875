//! Resource-aware task placement.
//!
//! Tasks are processed in the priority-biased topological order; each one
//! starts no earlier than its dependencies' ends, then gets swept forward on
//! every required equipment until all of them have a free slot. This is a
//! greedy sweep, not a search: the first feasible start wins.

mod book;

use serde::Serialize;
use std::collections::HashMap;
use tracing::{instrument, warn};

use crate::config::PlannerConfig;
use crate::equipment::EquipmentRegistry;
use crate::error::ValidationError;
use crate::graph::TaskGraph;
use crate::timeline::{Span, TimeSlot, Timeline};
use crate::units::{minutes, Minutes};
use crate::Id;
use book::PlacementBook;

/// Sequential-versus-parallel comparison for a task set.
#[derive(Debug, Clone, Serialize)]
pub struct TimeEstimate {
    /// Sum of every task duration: one cook, one thing at a time.
    #[serde(with = "crate::units::minute_repr")]
    pub sequential: Minutes,
    /// Total duration of the scheduled timeline.
    #[serde(with = "crate::units::minute_repr")]
    pub parallel: Minutes,
    /// `sequential - parallel`; negative when cleanup buffers dominate.
    #[serde(with = "crate::units::minute_repr")]
    pub savings: Minutes,
}

/// Stateless placement engine borrowing the registry and configuration.
pub struct Scheduler<'a> {
    registry: &'a EquipmentRegistry,
    config: &'a PlannerConfig,
}

impl<'a> Scheduler<'a> {
    pub fn new(registry: &'a EquipmentRegistry, config: &'a PlannerConfig) -> Self {
        Self { registry, config }
    }

    /// Schedules the whole task set onto a fresh timeline.
    pub fn schedule(&self, graph: &TaskGraph) -> Result<Timeline, ValidationError> {
        self.schedule_constrained(graph, &HashMap::new(), None)
    }

    /// Schedules with caller-supplied per-equipment availability windows
    /// (pairs of open/close minutes).
    pub fn schedule_with_windows(
        &self,
        graph: &TaskGraph,
        windows: &HashMap<Id, Vec<Span>>,
    ) -> Result<Timeline, ValidationError> {
        self.schedule_constrained(graph, windows, None)
    }

    /// Re-schedules the full task set with one task pinned to start no
    /// earlier than `new_start`.
    ///
    /// # Errors
    ///
    /// [`ValidationError::UnknownTask`] if `task_id` is not in the set.
    pub fn reschedule(
        &self,
        graph: &TaskGraph,
        task_id: &str,
        new_start: Minutes,
    ) -> Result<Timeline, ValidationError> {
        if graph.task(task_id).is_none() {
            return Err(ValidationError::UnknownTask(task_id.to_string()));
        }
        self.schedule_constrained(graph, &HashMap::new(), Some((task_id, new_start)))
    }

    #[instrument(skip_all, fields(tasks = graph.len()))]
    fn schedule_constrained(
        &self,
        graph: &TaskGraph,
        windows: &HashMap<Id, Vec<Span>>,
        pin: Option<(&str, Minutes)>,
    ) -> Result<Timeline, ValidationError> {
        let order = graph.topo_order()?;
        let mut book = PlacementBook::new(self.registry, windows);
        let mut finish: HashMap<Id, Minutes> = HashMap::with_capacity(order.len());
        let mut slots = Vec::with_capacity(order.len());

        for node in order {
            let task = graph
                .task_at(node)
                .expect("topological order only yields known nodes");

            for equipment in &task.equipment {
                if self.registry.get(equipment).is_none() {
                    warn!(
                        task = %task.id,
                        equipment = %equipment,
                        "unknown equipment; scheduling as single-slot and uncleanable"
                    );
                }
            }

            // Dependencies first, then any reschedule pin.
            let mut start = minutes(0.0);
            for dependency in &task.dependencies {
                let end = finish[dependency];
                if end.value() > start.value() {
                    start = end;
                }
            }
            if let Some((pinned_id, pinned_start)) = pin {
                if pinned_id == task.id && pinned_start.value() > start.value() {
                    start = pinned_start;
                }
            }

            let start = book.earliest_start(&task.equipment, start, task.duration);
            let span = Span::new(start, start + task.duration);
            book.hold(&task.equipment, span);
            finish.insert(task.id.clone(), span.end());
            slots.push(TimeSlot::new(task.id.clone(), span, task.equipment.clone()));

            let buffer = self.config.cleaning_buffer;
            if buffer.value() > 0.0 && task.cleaning_time.value() > 0.0 {
                let wipe = task.cleaning_time.value().min(buffer.value());
                let cleanup = Span::new(span.end(), minutes(span.end().value() + wipe));
                book.extend_last_hold(&task.equipment, cleanup.end());
                slots.push(TimeSlot::cleanup(&task.id, cleanup, task.equipment.clone()));
            }
        }

        Ok(Timeline::from_slots(slots, graph.critical_path()?))
    }

    /// Total time if every task ran back to back.
    pub fn sequential_estimate(graph: &TaskGraph) -> Minutes {
        minutes(graph.tasks().map(|task| task.duration.value()).sum())
    }

    /// Schedules and compares against the sequential baseline.
    pub fn estimate(&self, graph: &TaskGraph) -> Result<TimeEstimate, ValidationError> {
        let sequential = Self::sequential_estimate(graph);
        let timeline = self.schedule(graph)?;
        let parallel = timeline.total_duration;
        Ok(TimeEstimate {
            sequential,
            parallel,
            savings: sequential - parallel,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Priority, TaskType};
    use crate::test_utils::{m, task};

    fn schedule(tasks: Vec<crate::task::PrepTask>) -> Timeline {
        let registry = EquipmentRegistry::new();
        let config = PlannerConfig::default();
        let graph = TaskGraph::build(tasks).unwrap();
        Scheduler::new(&registry, &config).schedule(&graph).unwrap()
    }

    // ── Basic placement ───────────────────────────────────────────────

    #[test]
    fn shared_burner_runs_back_to_back() {
        let timeline = schedule(vec![
            task("t1", TaskType::Cook, 10.0, &["burner-1"]),
            task("t2", TaskType::Cook, 10.0, &["burner-1"]),
        ]);
        assert_eq!(timeline.total_duration.value(), 20.0);
        let t1 = timeline.slot_for("t1").unwrap();
        let t2 = timeline.slot_for("t2").unwrap();
        assert_eq!((t1.start().value(), t1.end().value()), (0.0, 10.0));
        assert_eq!((t2.start().value(), t2.end().value()), (10.0, 20.0));
    }

    #[test]
    fn disjoint_equipment_runs_in_parallel() {
        let timeline = schedule(vec![
            task("simmer", TaskType::Simmer, 30.0, &["pot-large", "burner-1"]),
            task("chop", TaskType::Prep, 10.0, &["cutting-board-1"]),
        ]);
        assert_eq!(timeline.total_duration.value(), 30.0);
        assert_eq!(timeline.slot_for("chop").unwrap().start().value(), 0.0);
    }

    #[test]
    fn dependencies_delay_start() {
        let timeline = schedule(vec![
            task("chop", TaskType::Prep, 10.0, &["cutting-board-1"]),
            task("saute", TaskType::Cook, 8.0, &["skillet-large"]).with_dependencies(["chop"]),
        ]);
        let saute = timeline.slot_for("saute").unwrap();
        assert_eq!(saute.start().value(), 10.0);
        assert_eq!(saute.end().value(), 18.0);
    }

    #[test]
    fn oven_admits_two_then_defers_third() {
        let timeline = schedule(vec![
            task("roast-a", TaskType::Bake, 20.0, &["oven"]).with_priority(Priority::High),
            task("roast-b", TaskType::Bake, 20.0, &["oven"]),
            task("roast-c", TaskType::Bake, 20.0, &["oven"]).with_priority(Priority::Low),
        ]);
        assert_eq!(timeline.slot_for("roast-a").unwrap().start().value(), 0.0);
        assert_eq!(timeline.slot_for("roast-b").unwrap().start().value(), 0.0);
        assert_eq!(timeline.slot_for("roast-c").unwrap().start().value(), 20.0);
        assert_eq!(timeline.total_duration.value(), 40.0);
    }

    #[test]
    fn capacity_invariant_holds_everywhere() {
        let registry = EquipmentRegistry::new();
        let timeline = schedule(vec![
            task("a", TaskType::Bake, 20.0, &["oven"]),
            task("b", TaskType::Bake, 25.0, &["oven"]),
            task("c", TaskType::Bake, 15.0, &["oven"]),
            task("d", TaskType::Cook, 10.0, &["burner-1"]),
            task("e", TaskType::Cook, 10.0, &["burner-1"]),
            task("f", TaskType::Prep, 10.0, &["counter-prep"]),
            task("g", TaskType::Prep, 10.0, &["counter-prep"]),
            task("h", TaskType::Prep, 10.0, &["counter-prep"]),
        ]);
        for (id, usage) in &timeline.equipment_usage {
            let capacity = registry.concurrency(id) as usize;
            // Sweep the span endpoints, ends released before starts.
            let mut events: Vec<(f64, i32)> = usage
                .spans
                .iter()
                .flat_map(|s| [(s.start().value(), 1), (s.end().value(), -1)])
                .collect();
            events.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            let mut active = 0_i32;
            for (at, delta) in events {
                active += delta;
                assert!(
                    active as usize <= capacity,
                    "{id} holds {active} > {capacity} at {at}"
                );
            }
        }
    }

    #[test]
    fn priority_wins_contested_equipment() {
        let timeline = schedule(vec![
            task("later", TaskType::Cook, 10.0, &["burner-1"]).with_priority(Priority::Low),
            task("first", TaskType::Cook, 10.0, &["burner-1"]).with_priority(Priority::Critical),
        ]);
        assert_eq!(timeline.slot_for("first").unwrap().start().value(), 0.0);
        assert_eq!(timeline.slot_for("later").unwrap().start().value(), 10.0);
    }

    // ── Cleanup slots ─────────────────────────────────────────────────

    #[test]
    fn cleanup_buffer_appends_trailing_slot() {
        let registry = EquipmentRegistry::new();
        let config = PlannerConfig {
            cleaning_buffer: m(5.0),
            ..PlannerConfig::default()
        };
        let graph = TaskGraph::build(vec![task("sear", TaskType::Cook, 10.0, &["skillet-large"])
            .with_cleaning_time(m(8.0))])
        .unwrap();
        let timeline = Scheduler::new(&registry, &config).schedule(&graph).unwrap();

        let cleanup = timeline
            .slots
            .iter()
            .find(|slot| slot.is_cleanup)
            .expect("cleanup slot");
        assert_eq!(cleanup.task_id, "sear-cleanup");
        // Buffer caps the cleanup at 5 of the 8 minutes.
        assert_eq!(cleanup.start().value(), 10.0);
        assert_eq!(cleanup.end().value(), 15.0);
        assert_eq!(timeline.total_duration.value(), 15.0);
    }

    #[test]
    fn cleanup_extends_equipment_hold() {
        let registry = EquipmentRegistry::new();
        let config = PlannerConfig {
            cleaning_buffer: m(5.0),
            ..PlannerConfig::default()
        };
        let graph = TaskGraph::build(vec![
            task("sear", TaskType::Cook, 10.0, &["skillet-large"]).with_cleaning_time(m(5.0)),
            task("fry", TaskType::Cook, 10.0, &["skillet-large"]),
        ])
        .unwrap();
        let timeline = Scheduler::new(&registry, &config).schedule(&graph).unwrap();
        // The follower waits out the cleanup.
        assert_eq!(timeline.slot_for("fry").unwrap().start().value(), 15.0);
    }

    #[test]
    fn zero_buffer_means_no_cleanup_slots() {
        let timeline = schedule(vec![
            task("sear", TaskType::Cook, 10.0, &["skillet-large"]).with_cleaning_time(m(5.0))
        ]);
        assert!(timeline.slots.iter().all(|slot| !slot.is_cleanup));
    }

    // ── Windows & reschedule ──────────────────────────────────────────

    #[test]
    fn availability_window_delays_task() {
        let registry = EquipmentRegistry::new();
        let config = PlannerConfig::default();
        let graph =
            TaskGraph::build(vec![task("bake", TaskType::Bake, 30.0, &["oven"])]).unwrap();
        let mut windows = HashMap::new();
        windows.insert("oven".to_string(), vec![Span::from_f64(45.0, 120.0)]);
        let timeline = Scheduler::new(&registry, &config)
            .schedule_with_windows(&graph, &windows)
            .unwrap();
        assert_eq!(timeline.slot_for("bake").unwrap().start().value(), 45.0);
    }

    #[test]
    fn reschedule_pins_task_start() {
        let registry = EquipmentRegistry::new();
        let config = PlannerConfig::default();
        let graph = TaskGraph::build(vec![
            task("chop", TaskType::Prep, 10.0, &["cutting-board-1"]),
            task("rest", TaskType::Rest, 10.0, &["counter-main"]),
        ])
        .unwrap();
        let timeline = Scheduler::new(&registry, &config)
            .reschedule(&graph, "rest", m(30.0))
            .unwrap();
        assert_eq!(timeline.slot_for("rest").unwrap().start().value(), 30.0);
        assert_eq!(timeline.slot_for("chop").unwrap().start().value(), 0.0);
    }

    #[test]
    fn reschedule_unknown_task_fails() {
        let registry = EquipmentRegistry::new();
        let config = PlannerConfig::default();
        let graph = TaskGraph::build(Vec::new()).unwrap();
        let result = Scheduler::new(&registry, &config).reschedule(&graph, "ghost", m(0.0));
        assert_eq!(result.unwrap_err(), ValidationError::UnknownTask("ghost".into()));
    }

    // ── Estimators ────────────────────────────────────────────────────

    #[test]
    fn estimate_reports_savings() {
        let registry = EquipmentRegistry::new();
        let config = PlannerConfig::default();
        let graph = TaskGraph::build(vec![
            task("simmer", TaskType::Simmer, 30.0, &["pot-large"]),
            task("chop", TaskType::Prep, 10.0, &["cutting-board-1"]),
        ])
        .unwrap();
        let estimate = Scheduler::new(&registry, &config).estimate(&graph).unwrap();
        assert_eq!(estimate.sequential.value(), 40.0);
        assert_eq!(estimate.parallel.value(), 30.0);
        assert_eq!(estimate.savings.value(), 10.0);
    }

    #[test]
    fn sequential_never_below_parallel_without_buffer() {
        let registry = EquipmentRegistry::new();
        let config = PlannerConfig::default();
        let graph = TaskGraph::build(vec![
            task("a", TaskType::Cook, 12.0, &["burner-1"]),
            task("b", TaskType::Bake, 25.0, &["oven"]),
            task("c", TaskType::Prep, 7.0, &["cutting-board-1"]).with_dependencies(["a"]),
        ])
        .unwrap();
        let estimate = Scheduler::new(&registry, &config).estimate(&graph).unwrap();
        assert!(estimate.sequential.value() >= estimate.parallel.value() - 1e-9);
    }
}
