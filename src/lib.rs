//! prepline - Prep-Run Engine for Parallel Line Cooking
//!
//! A meal-prep scheduling engine: cooking tasks with durations, dependencies,
//! equipment requirements and attention flags are placed onto a shared kitchen
//! timeline that respects equipment capacity, repairs scheduling conflicts,
//! packs hands-off stretches with parallel work and slots cleanup into idle
//! gaps.

pub mod cleaning;
pub mod config;
pub mod conflict;
pub mod equipment;
pub mod error;
pub mod graph;
pub mod orchestrator;
pub mod parallel;
pub mod scheduler;
pub mod task;
pub mod timeline;
pub mod units;
pub mod viz;

pub use config::PlannerConfig;
pub use error::ValidationError;
pub use orchestrator::{PlanSummary, PrepOrchestrator, PrepPlan};
pub use units::{minutes, Minutes};

/// Identifier type used for tasks, equipment, and plan artifacts.
pub type Id = String;

/// Generates a new unique identifier (UUID v4).
pub fn generate_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}
