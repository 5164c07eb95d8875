use thiserror::Error;

/// Fatal validation failures.
///
/// These are the only conditions that abort an optimisation run. Every other
/// anomaly (unknown equipment, unresolvable conflicts) is reported as data in
/// the returned plan, never as an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("task `{task}` depends on unknown task `{dependency}`")]
    UnknownDependency { task: String, dependency: String },

    #[error("task id already present in the plan: {0}")]
    DuplicateTask(String),

    #[error("tasks form a dependency cycle: {}", .names.join(", "))]
    TaskCycle { names: Vec<String> },

    #[error("unknown task: {0}")]
    UnknownTask(String),
}
