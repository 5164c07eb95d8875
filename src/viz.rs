//! Gantt rendering of a scheduled timeline.
//!
//! The chart is a plain data structure built once from (timeline, tasks,
//! view); the three renderers are pure functions of it and never feed back
//! into planning.

use serde::Serialize;
use std::collections::HashMap;

use crate::task::PrepTask;
use crate::timeline::{TimeSlot, Timeline};
use crate::Id;

/// Row orientation: one row per task, or one per equipment id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartView {
    ByTask,
    ByEquipment,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSegment {
    pub task_id: Id,
    pub start: f64,
    pub end: f64,
    pub is_cleanup: bool,
    /// Newline-separated task metadata for hover text.
    pub tooltip: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartRow {
    pub label: String,
    pub segments: Vec<ChartSegment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Milestone {
    pub at: f64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GanttChart {
    pub view: ChartView,
    /// Total duration in minutes.
    pub total: f64,
    /// Minutes per header tick.
    pub scale: f64,
    pub rows: Vec<ChartRow>,
    pub milestones: Vec<Milestone>,
}

/// Header tick spacing for a given total duration.
pub fn time_scale(total_minutes: f64) -> f64 {
    if total_minutes <= 30.0 {
        5.0
    } else if total_minutes <= 60.0 {
        10.0
    } else if total_minutes <= 120.0 {
        15.0
    } else if total_minutes <= 180.0 {
        20.0
    } else {
        30.0
    }
}

fn tooltip_for(slot: &TimeSlot, task: Option<&PrepTask>) -> String {
    let mut lines = Vec::new();
    match task {
        Some(task) => {
            lines.push(task.name.clone());
            lines.push(format!(
                "{:.0}-{:.0} min ({:.0} min)",
                slot.start().value(),
                slot.end().value(),
                slot.span.duration().value()
            ));
            lines.push(format!("Equipment: {}", slot.equipment.join(", ")));
            lines.push(format!("Priority: {:?}", task.priority));
            if let Some(temperature) = task.temperature {
                lines.push(format!("Temperature: {temperature:.0}"));
            }
            if let Some(notes) = &task.notes {
                lines.push(notes.clone());
            }
        }
        None => {
            lines.push(slot.task_id.clone());
            lines.push(format!(
                "{:.0}-{:.0} min",
                slot.start().value(),
                slot.end().value()
            ));
        }
    }
    if slot.is_cleanup {
        lines.push("Cleanup".to_string());
    }
    lines.join("\n")
}

fn segment_for(slot: &TimeSlot, by_id: &HashMap<&str, &PrepTask>) -> ChartSegment {
    let task = by_id.get(slot.owner_id()).copied();
    ChartSegment {
        task_id: slot.task_id.clone(),
        start: slot.start().value(),
        end: slot.end().value(),
        is_cleanup: slot.is_cleanup,
        tooltip: tooltip_for(slot, task),
    }
}

/// Builds the chart model. In the by-task view a task's cleanup slot shares
/// its owner's row (paired through the `-cleanup` id suffix); in the
/// by-equipment view every slot lands on each equipment row it holds.
pub fn build_chart(timeline: &Timeline, tasks: &[PrepTask], view: ChartView) -> GanttChart {
    let by_id: HashMap<&str, &PrepTask> =
        tasks.iter().map(|task| (task.id.as_str(), task)).collect();
    let total = timeline.total_duration.value();

    let rows = match view {
        ChartView::ByTask => {
            let mut rows: Vec<ChartRow> = Vec::new();
            let mut row_of: HashMap<&str, usize> = HashMap::new();
            for slot in &timeline.slots {
                let owner = slot.owner_id();
                let at = match row_of.get(owner).copied() {
                    Some(at) => at,
                    None => {
                        let label = by_id
                            .get(owner)
                            .map(|task| task.name.clone())
                            .unwrap_or_else(|| owner.to_string());
                        rows.push(ChartRow {
                            label,
                            segments: Vec::new(),
                        });
                        row_of.insert(owner, rows.len() - 1);
                        rows.len() - 1
                    }
                };
                rows[at].segments.push(segment_for(slot, &by_id));
            }
            rows
        }
        ChartView::ByEquipment => {
            let mut equipment: Vec<&Id> = timeline.equipment_usage.keys().collect();
            equipment.sort();
            equipment
                .into_iter()
                .map(|id| ChartRow {
                    label: id.clone(),
                    segments: timeline
                        .slots
                        .iter()
                        .filter(|slot| slot.holds(id))
                        .map(|slot| segment_for(slot, &by_id))
                        .collect(),
                })
                .collect()
        }
    };

    let mut milestones = vec![Milestone {
        at: 0.0,
        label: "start".to_string(),
    }];
    for task_id in &timeline.critical_path {
        if let Some(slot) = timeline.slot_for(task_id) {
            let name = by_id
                .get(task_id.as_str())
                .map(|task| task.name.as_str())
                .unwrap_or(task_id.as_str());
            milestones.push(Milestone {
                at: slot.end().value(),
                label: format!("{name} done"),
            });
        }
    }
    milestones.push(Milestone {
        at: total,
        label: "complete".to_string(),
    });

    GanttChart {
        view,
        total,
        scale: time_scale(total),
        rows,
        milestones,
    }
}

/// JSON passthrough of the chart model.
pub fn render_json(chart: &GanttChart) -> serde_json::Value {
    serde_json::to_value(chart).unwrap_or(serde_json::Value::Null)
}

/// Fixed-width ASCII grid: label gutter, time header, `#` for active work,
/// `-` for cleanup, footer with the total and milestones.
pub fn render_ascii(chart: &GanttChart) -> String {
    const GUTTER: usize = 18;
    if chart.total <= 0.0 {
        return "(empty timeline)\n".to_string();
    }

    // One cell per fifth of a tick keeps rows readable at any scale.
    let cell = chart.scale / 5.0;
    let columns = (chart.total / cell).ceil() as usize;

    let mut out = String::new();

    // Time header: tick values left-aligned at their column.
    let mut header = vec![b' '; columns];
    let mut tick = 0.0;
    while tick <= chart.total {
        let column = (tick / cell) as usize;
        for (offset, digit) in format!("{tick:.0}").bytes().enumerate() {
            if column + offset < columns {
                header[column + offset] = digit;
            }
        }
        tick += chart.scale;
    }
    out.push_str(&" ".repeat(GUTTER + 1));
    out.push_str(std::str::from_utf8(&header).expect("ascii header"));
    out.push('\n');

    let gutter = GUTTER;
    for row in &chart.rows {
        let mut label = row.label.clone();
        label.truncate(gutter);
        out.push_str(&format!("{label:<gutter$} "));

        let mut cells = vec![' '; columns];
        for segment in &row.segments {
            let from = (segment.start / cell) as usize;
            let to = ((segment.end / cell).ceil() as usize).min(columns);
            let mark = if segment.is_cleanup { '-' } else { '#' };
            for filled in cells.iter_mut().take(to).skip(from) {
                *filled = mark;
            }
        }
        out.extend(cells);
        out.push('\n');
    }

    out.push_str(&format!("\nTotal: {:.0} min\n", chart.total));
    for milestone in &chart.milestones {
        out.push_str(&format!("  @{:>4.0}  {}\n", milestone.at, milestone.label));
    }
    out
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// HTML block with percent-positioned segments and tooltip titles.
pub fn render_html(chart: &GanttChart) -> String {
    let mut out = String::from(
        "<div class=\"gantt\">\n<style>\n.gantt{font-family:sans-serif}\
\n.gantt-row{display:flex;align-items:center;margin:2px 0}\
\n.gantt-label{width:10em;flex-shrink:0;font-size:12px}\
\n.gantt-track{position:relative;flex-grow:1;height:18px;background:#f0f0f0}\
\n.gantt-seg{position:absolute;top:0;height:100%;background:#4a90d9;color:#fff;\
font-size:10px;overflow:hidden;white-space:nowrap}\
\n.gantt-seg.cleanup{background:#9bbf8a}\n</style>\n",
    );

    let total = if chart.total > 0.0 { chart.total } else { 1.0 };
    for row in &chart.rows {
        out.push_str(&format!(
            "<div class=\"gantt-row\"><span class=\"gantt-label\">{}</span><div class=\"gantt-track\">",
            escape_html(&row.label)
        ));
        for segment in &row.segments {
            let left = segment.start / total * 100.0;
            let width = (segment.end - segment.start) / total * 100.0;
            let class = if segment.is_cleanup {
                "gantt-seg cleanup"
            } else {
                "gantt-seg"
            };
            out.push_str(&format!(
                "<div class=\"{class}\" style=\"left:{left:.2}%;width:{width:.2}%\" title=\"{}\">{}</div>",
                escape_html(&segment.tooltip),
                escape_html(&segment.task_id),
            ));
        }
        out.push_str("</div></div>\n");
    }
    out.push_str("</div>\n");
    out
}
