//! Parallel-opportunity analysis.
//!
//! Hands-off stretches (a braise in the oven, rice in the cooker) are hosts:
//! their idle minutes absorb compatible hands-on work. Packing is greedy,
//! longest host and longest companion first, and an active task joins at
//! most one host.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::config::PlannerConfig;
use crate::equipment::{EquipmentCategory, EquipmentRegistry};
use crate::graph::TaskGraph;
use crate::task::{PrepTask, Priority, TaskType};
use crate::timeline::Timeline;
use crate::units::{minutes, Minutes};
use crate::Id;

/// Utilisation below which a piece of equipment is flagged as underused.
const LOW_UTILISATION_PERCENT: f64 = 30.0;
/// Mean burner utilisation below which consolidation is suggested.
const BURNER_CONSOLIDATION_PERCENT: f64 = 50.0;

/// One host with the active tasks packed into its hands-off stretch.
#[derive(Debug, Clone, Serialize)]
pub struct ParallelSuggestion {
    pub host: Id,
    pub companions: Vec<Id>,
    #[serde(with = "crate::units::minute_repr")]
    pub time_saved: Minutes,
    pub note: String,
}

/// Packing suggestions plus the caveats a cook should read first.
#[derive(Debug, Clone, Serialize, Default)]
pub struct ParallelReport {
    pub suggestions: Vec<ParallelSuggestion>,
    pub warnings: Vec<String>,
    pub advisories: Vec<String>,
}

fn is_passive(task: &PrepTask) -> bool {
    !task.requires_attention
        && matches!(
            task.task_type,
            TaskType::Simmer | TaskType::Bake | TaskType::Rest | TaskType::Cook
        )
}

fn is_active(task: &PrepTask) -> bool {
    matches!(task.task_type, TaskType::Prep | TaskType::Assemble) || task.requires_attention
}

/// Packs compatible active tasks into passive hosts.
pub fn analyse_opportunities(graph: &TaskGraph, config: &PlannerConfig) -> ParallelReport {
    let mut hosts: Vec<&PrepTask> = graph.tasks().filter(|task| is_passive(task)).collect();
    hosts.sort_by(|a, b| b.duration.value().total_cmp(&a.duration.value()));

    let actives: Vec<&PrepTask> = graph.tasks().filter(|task| is_active(task)).collect();

    // Reachability memo for this run; both directions rule a pair out.
    let mut related: HashMap<(Id, Id), bool> = HashMap::new();
    let mut dependent = |a: &PrepTask, b: &PrepTask| -> bool {
        *related
            .entry((a.id.clone(), b.id.clone()))
            .or_insert_with(|| graph.reaches(&a.id, &b.id) || graph.reaches(&b.id, &a.id))
    };

    let mut assigned: HashSet<Id> = HashSet::new();
    let mut report = ParallelReport::default();

    for host in hosts {
        let host_equipment: HashSet<&str> = host.equipment.iter().map(Id::as_str).collect();
        let mut candidates: Vec<&PrepTask> = actives
            .iter()
            .copied()
            .filter(|candidate| {
                candidate.id != host.id
                    && candidate.can_parallel
                    && !assigned.contains(&candidate.id)
                    && candidate
                        .equipment
                        .iter()
                        .all(|id| !host_equipment.contains(id.as_str()))
                    && !dependent(host, candidate)
            })
            .collect();
        candidates.sort_by(|a, b| b.duration.value().total_cmp(&a.duration.value()));

        let mut picked: Vec<&PrepTask> = Vec::new();
        let mut packed = 0.0_f64;
        for candidate in candidates {
            if picked.len() >= config.max_parallel_tasks {
                break;
            }
            if packed + candidate.duration.value() <= host.duration.value() {
                packed += candidate.duration.value();
                picked.push(candidate);
            }
        }
        if picked.is_empty() {
            continue;
        }

        for id in picked.iter().map(|task| task.id.clone()) {
            assigned.insert(id);
        }
        let names: Vec<&str> = picked.iter().map(|task| task.name.as_str()).collect();
        let suggestion = ParallelSuggestion {
            host: host.id.clone(),
            companions: picked.iter().map(|task| task.id.clone()).collect(),
            time_saved: minutes(packed),
            note: format!(
                "While {} runs unattended, knock out {} (saves {:.0} min)",
                host.name,
                names.join(", "),
                packed
            ),
        };

        let demanding = picked.iter().filter(|task| task.requires_attention).count();
        if demanding > 1 {
            report.warnings.push(format!(
                "{} packs {} attention-demanding tasks; expect to bounce between them",
                host.name, demanding
            ));
        }
        if picked.len() >= 3 {
            report.warnings.push(format!(
                "{} is carrying {} parallel tasks; that is a full plate",
                host.name,
                picked.len()
            ));
        }
        for critical in picked.iter().filter(|t| t.priority == Priority::Critical) {
            report.warnings.push(format!(
                "Critical task {} is packed alongside {}; do not let it slip",
                critical.name, host.name
            ));
        }

        report.suggestions.push(suggestion);
    }

    report
}

/// Flags underused equipment and scattered burner work on a scheduled
/// timeline.
pub fn utilisation_advisory(timeline: &Timeline, registry: &EquipmentRegistry) -> Vec<String> {
    let mut advisories = Vec::new();
    if timeline.total_duration.value() <= 0.0 {
        return advisories;
    }

    let mut used: Vec<&Id> = timeline.equipment_usage.keys().collect();
    used.sort();
    for equipment in used {
        let utilisation = timeline.equipment_usage[equipment].utilisation;
        if utilisation < LOW_UTILISATION_PERCENT {
            advisories.push(format!(
                "{} sits idle most of the run ({:.0}% used); consider folding its work elsewhere",
                equipment, utilisation
            ));
        }
    }

    let burners = registry.by_category(EquipmentCategory::Stovetop);
    if !burners.is_empty() {
        let mean: f64 = burners
            .iter()
            .map(|burner| {
                timeline
                    .equipment_usage
                    .get(&burner.id)
                    .map(|usage| usage.utilisation)
                    .unwrap_or(0.0)
            })
            .sum::<f64>()
            / burners.len() as f64;
        if mean < BURNER_CONSOLIDATION_PERCENT {
            advisories.push(format!(
                "Burners average {:.0}% utilisation; consolidate stovetop work onto fewer burners",
                mean
            ));
        }
    }

    advisories
}
