//! Planner configuration.

use crate::cleaning::CleaningMethod;
use crate::units::{minutes, Minutes};

/// Tunable knobs for a planning run. Every field has a sensible default;
/// construct with `PlannerConfig::default()` and override what you need
/// using struct-update syntax.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Upper bound on active tasks packed alongside one passive host.
    pub max_parallel_tasks: usize,
    /// Number of attention-demanding tasks one operator can juggle before
    /// the detector flags an overload.
    pub attention_threshold: usize,
    /// Cap on the in-line cleanup slot appended after a task. Zero disables
    /// in-line cleanup entirely.
    pub cleaning_buffer: Minutes,
    /// Cleaning method assumed for equipment missing from the static
    /// cleaning table.
    pub preferred_cleaning_method: CleaningMethod,
    /// Discount applied to summed handwash durations when estimating total
    /// cleaning time: batching at the sink is faster than washing one item
    /// at a time.
    pub handwash_batch_efficiency: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_parallel_tasks: 3,
            attention_threshold: 2,
            cleaning_buffer: minutes(0.0),
            preferred_cleaning_method: CleaningMethod::Handwash,
            handwash_batch_efficiency: 0.8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.max_parallel_tasks, 3);
        assert_eq!(config.attention_threshold, 2);
        assert_eq!(config.cleaning_buffer.value(), 0.0);
        assert_eq!(config.preferred_cleaning_method, CleaningMethod::Handwash);
        assert!((config.handwash_batch_efficiency - 0.8).abs() < 1e-12);
    }

    #[test]
    fn struct_update_override() {
        let config = PlannerConfig {
            cleaning_buffer: minutes(5.0),
            ..PlannerConfig::default()
        };
        assert_eq!(config.cleaning_buffer.value(), 5.0);
        assert_eq!(config.max_parallel_tasks, 3);
    }
}
