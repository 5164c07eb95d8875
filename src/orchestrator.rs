//! Pipeline driver: validation → scheduling → detection → resolution →
//! second pass → cleaning plan → parallel report → chart.

use serde::Serialize;
use tracing::instrument;

use crate::cleaning::{self, CleaningPlan};
use crate::config::PlannerConfig;
use crate::conflict::{
    detect_conflicts, resolve_conflicts, Conflict, Resolution, ResolutionStrategy,
};
use crate::equipment::{Equipment, EquipmentRegistry, EquipmentStatus};
use crate::error::ValidationError;
use crate::graph::TaskGraph;
use crate::parallel::{self, ParallelReport};
use crate::scheduler::{Scheduler, TimeEstimate};
use crate::task::{PrepTask, TaskType};
use crate::timeline::Timeline;
use crate::units::{minutes, Minutes};
use crate::viz::{self, ChartView, GanttChart};
use crate::Id;

/// Everything one optimisation run produces.
#[derive(Debug, Clone, Serialize)]
pub struct PrepPlan {
    pub timeline: Timeline,
    pub conflicts: Vec<Conflict>,
    pub resolutions: Vec<Resolution>,
    pub cleaning_plan: CleaningPlan,
    pub optimisation: ParallelReport,
    pub gantt_chart: GanttChart,
}

/// Digest of a task set: hands-on versus hands-off minutes, the equipment
/// involved, and every suggestion the analysers produced.
#[derive(Debug, Clone, Serialize)]
pub struct PlanSummary {
    #[serde(with = "crate::units::minute_repr")]
    pub active_time: Minutes,
    #[serde(with = "crate::units::minute_repr")]
    pub passive_time: Minutes,
    pub equipment: Vec<Id>,
    pub suggestions: Vec<String>,
}

/// Owns the registry and configuration; every other engine component is a
/// stateless function borrowing them. Only the registry's status field
/// survives between runs.
pub struct PrepOrchestrator {
    config: PlannerConfig,
    registry: EquipmentRegistry,
}

impl Default for PrepOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl PrepOrchestrator {
    /// Default configuration, default kitchen catalog.
    pub fn new() -> Self {
        Self {
            config: PlannerConfig::default(),
            registry: EquipmentRegistry::new(),
        }
    }

    pub fn with_config(config: PlannerConfig) -> Self {
        Self {
            config,
            registry: EquipmentRegistry::new(),
        }
    }

    pub fn with_catalog(catalog: Vec<Equipment>) -> Self {
        Self {
            config: PlannerConfig::default(),
            registry: EquipmentRegistry::from_catalog(catalog),
        }
    }

    pub fn with_config_and_catalog(config: PlannerConfig, catalog: Vec<Equipment>) -> Self {
        Self {
            config,
            registry: EquipmentRegistry::from_catalog(catalog),
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn registry(&self) -> &EquipmentRegistry {
        &self.registry
    }

    /// Status transition on one equipment id; `false` if unknown.
    pub fn update_equipment_status(&mut self, id: &str, status: EquipmentStatus) -> bool {
        self.registry.set_status(id, status)
    }

    /// Runs the full pipeline over a task set.
    ///
    /// Fails only on validation (unresolved dependencies, duplicate ids,
    /// cycles); every other anomaly is data in the returned plan. When any
    /// resolution is mechanical, substitute swaps are applied to the task
    /// set and the scheduler runs a second pass; the plan carries the
    /// second-pass timeline and conflicts alongside the first-pass
    /// resolutions.
    #[instrument(skip_all, fields(tasks = tasks.len()))]
    pub fn optimise(&self, tasks: &[PrepTask]) -> Result<PrepPlan, ValidationError> {
        let scheduler = Scheduler::new(&self.registry, &self.config);

        let mut graph = TaskGraph::build(tasks.to_vec())?;
        let mut timeline = scheduler.schedule(&graph)?;
        let mut conflicts = detect_conflicts(&timeline, tasks, &self.registry, &self.config);
        let resolutions = resolve_conflicts(&conflicts, tasks, &self.registry);

        let mut final_tasks = tasks.to_vec();
        if resolutions.iter().any(|resolution| !resolution.is_manual()) {
            apply_substitutions(&mut final_tasks, &conflicts, &resolutions);
            graph = TaskGraph::build(final_tasks.clone())?;
            timeline = scheduler.schedule(&graph)?;
            conflicts = detect_conflicts(&timeline, &final_tasks, &self.registry, &self.config);
        }

        let cleaning_plan = cleaning::build_plan(&timeline, &self.registry, &self.config);
        let mut optimisation = parallel::analyse_opportunities(&graph, &self.config);
        optimisation.advisories = parallel::utilisation_advisory(&timeline, &self.registry);
        let gantt_chart = viz::build_chart(&timeline, &final_tasks, ChartView::ByTask);

        Ok(PrepPlan {
            timeline,
            conflicts,
            resolutions,
            cleaning_plan,
            optimisation,
            gantt_chart,
        })
    }

    /// Detection only, over any timeline (not necessarily one this engine
    /// produced).
    pub fn detect_conflicts(&self, timeline: &Timeline, tasks: &[PrepTask]) -> Vec<Conflict> {
        detect_conflicts(timeline, tasks, &self.registry, &self.config)
    }

    /// Resolution only.
    pub fn resolve_conflicts(&self, conflicts: &[Conflict], tasks: &[PrepTask]) -> Vec<Resolution> {
        resolve_conflicts(conflicts, tasks, &self.registry)
    }

    /// Cleaning plan for an existing timeline.
    pub fn generate_cleaning_plan(&self, timeline: &Timeline) -> CleaningPlan {
        cleaning::build_plan(timeline, &self.registry, &self.config)
    }

    /// Host/companion packing analysis for a task set (no timeline needed).
    pub fn analyse_parallel_opportunities(
        &self,
        tasks: &[PrepTask],
    ) -> Result<ParallelReport, ValidationError> {
        let graph = TaskGraph::build(tasks.to_vec())?;
        Ok(parallel::analyse_opportunities(&graph, &self.config))
    }

    /// Sequential-versus-scheduled comparison.
    pub fn estimate_total_time(&self, tasks: &[PrepTask]) -> Result<TimeEstimate, ValidationError> {
        let graph = TaskGraph::build(tasks.to_vec())?;
        Scheduler::new(&self.registry, &self.config).estimate(&graph)
    }

    /// Critical path through the dependency DAG.
    pub fn find_critical_path(&self, tasks: &[PrepTask]) -> Result<Vec<Id>, ValidationError> {
        TaskGraph::build(tasks.to_vec())?.critical_path()
    }

    /// Full run plus a digest: hands-on/hands-off minutes, the equipment
    /// set in first-use order, and the concatenated suggestions of the
    /// optimiser, the cleaning planner and the utilisation advisory.
    pub fn summary(&self, tasks: &[PrepTask]) -> Result<PlanSummary, ValidationError> {
        let plan = self.optimise(tasks)?;

        let mut active = 0.0;
        let mut passive = 0.0;
        for task in tasks {
            let hands_off = !task.requires_attention
                && matches!(
                    task.task_type,
                    TaskType::Simmer | TaskType::Bake | TaskType::Rest | TaskType::Cook
                );
            if hands_off {
                passive += task.duration.value();
            } else {
                active += task.duration.value();
            }
        }

        let mut equipment: Vec<Id> = Vec::new();
        for task in tasks {
            for id in &task.equipment {
                if !equipment.contains(id) {
                    equipment.push(id.clone());
                }
            }
        }

        let mut suggestions: Vec<String> = plan
            .optimisation
            .suggestions
            .iter()
            .map(|suggestion| suggestion.note.clone())
            .collect();
        suggestions.extend(plan.cleaning_plan.suggestions());
        suggestions.extend(plan.optimisation.advisories.iter().cloned());

        Ok(PlanSummary {
            active_time: minutes(active),
            passive_time: minutes(passive),
            equipment,
            suggestions,
        })
    }
}

/// Applies substitute resolutions in place: the conflicted equipment id is
/// swapped for the substitute on the lowest-priority involved task, leaving
/// the higher-priority holder on the original equipment. Reschedule,
/// sequential and split resolutions are never applied here; the second
/// scheduling pass places those tasks legally on its own.
fn apply_substitutions(tasks: &mut [PrepTask], conflicts: &[Conflict], resolutions: &[Resolution]) {
    for resolution in resolutions
        .iter()
        .filter(|resolution| resolution.strategy == ResolutionStrategy::Substitute)
    {
        let Some(substitute) = &resolution.substitute else {
            continue;
        };
        let Some(conflict) = conflicts
            .iter()
            .find(|conflict| conflict.id == resolution.conflict_id)
        else {
            continue;
        };
        let Some(contested) = &conflict.equipment else {
            continue;
        };

        let victim = conflict
            .tasks
            .iter()
            .filter_map(|id| tasks.iter().position(|task| &task.id == id))
            .max_by_key(|&at| tasks[at].priority.rank());
        if let Some(at) = victim {
            for held in tasks[at].equipment.iter_mut() {
                if held == contested {
                    *held = substitute.clone();
                }
            }
        }
    }
}
