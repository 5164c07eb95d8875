//! End-to-end tour of the prep planner: a weeknight stir-fry dinner with
//! rice, a simmered sauce and roasted vegetables.
//!
//! Run with: cargo run --example meal_plan_demo

use prepline::cleaning::CleaningMethod;
use prepline::config::PlannerConfig;
use prepline::minutes;
use prepline::orchestrator::PrepOrchestrator;
use prepline::task::{PrepTask, Priority, TaskType};
use prepline::viz;

fn main() {
    let tasks = vec![
        PrepTask::new("rice", "Steam Rice", TaskType::Simmer, minutes(35.0))
            .with_equipment(["rice-cooker"])
            .with_cleaning_time(minutes(4.0)),
        PrepTask::new("chop", "Chop Vegetables", TaskType::Prep, minutes(12.0))
            .with_equipment(["cutting-board-1"])
            .with_attention(true)
            .with_parallel(true)
            .with_cleaning_time(minutes(2.0)),
        PrepTask::new("sauce", "Simmer Sauce", TaskType::Simmer, minutes(20.0))
            .with_equipment(["pot-small", "burner-3"])
            .with_cleaning_time(minutes(3.0)),
        PrepTask::new("roast", "Roast Squash", TaskType::Bake, minutes(30.0))
            .with_equipment(["oven", "sheet-pan-1"])
            .with_temperature(425.0)
            .with_cleaning_time(minutes(3.0)),
        PrepTask::new("stir-fry", "Stir-Fry Vegetables", TaskType::Cook, minutes(10.0))
            .with_equipment(["wok", "burner-1"])
            .with_dependencies(["chop"])
            .with_priority(Priority::High)
            .with_attention(true)
            .with_cleaning_time(minutes(5.0)),
        PrepTask::new("plate", "Plate Everything", TaskType::Assemble, minutes(5.0))
            .with_equipment(["counter-main"])
            .with_dependencies(["rice", "sauce", "roast", "stir-fry"])
            .with_priority(Priority::Critical),
    ];

    let config = PlannerConfig {
        cleaning_buffer: minutes(3.0),
        ..PlannerConfig::default()
    };
    let orchestrator = PrepOrchestrator::with_config(config);

    let plan = orchestrator.optimise(&tasks).expect("valid task set");

    println!("=== Timeline ===");
    println!("{}", viz::render_ascii(&plan.gantt_chart));

    if !plan.conflicts.is_empty() {
        println!("=== Conflicts ===");
        for conflict in &plan.conflicts {
            println!("  [{:?}] {}", conflict.severity, conflict.description);
        }
        for resolution in &plan.resolutions {
            println!("  -> [{:?}] {}", resolution.strategy, resolution.explanation);
        }
        println!();
    }

    println!("=== Parallel opportunities ===");
    for suggestion in &plan.optimisation.suggestions {
        println!("  {}", suggestion.note);
    }
    for warning in &plan.optimisation.warnings {
        println!("  (!) {warning}");
    }
    println!();

    println!("=== Cleaning ===");
    for batch in &plan.cleaning_plan.handwash_batches {
        let items: Vec<&str> = batch.iter().map(|t| t.equipment_name.as_str()).collect();
        println!("  Sink batch: {}", items.join(", "));
    }
    for (number, load) in plan.cleaning_plan.dishwasher_loads.iter().enumerate() {
        println!("  Dishwasher load {}: {} items", number + 1, load.len());
    }
    let soaks: Vec<&str> = plan
        .cleaning_plan
        .tasks
        .iter()
        .filter(|t| t.method == CleaningMethod::Soak)
        .map(|t| t.equipment_name.as_str())
        .collect();
    if !soaks.is_empty() {
        println!("  Soaking: {}", soaks.join(", "));
    }
    println!(
        "  Total cleanup: about {:.0} min",
        plan.cleaning_plan.total_time.value()
    );
    println!();

    let summary = orchestrator.summary(&tasks).expect("valid task set");
    println!("=== Summary ===");
    println!(
        "  Hands-on {:.0} min, hands-off {:.0} min",
        summary.active_time.value(),
        summary.passive_time.value()
    );
    for suggestion in &summary.suggestions {
        println!("  - {suggestion}");
    }
}
