//! Per-equipment placement bookkeeping for the scheduling sweep.

use std::collections::HashMap;

use crate::equipment::EquipmentRegistry;
use crate::timeline::Span;
use crate::units::Minutes;
use crate::Id;

/// Tracks the spans already placed on each equipment id during one
/// scheduling pass.
///
/// Each equipment id behaves as a counting mutex with capacity
/// `slots ∨ capacity ∨ 1`; equipment missing from the registry counts as
/// single-slot. Caller-supplied availability windows constrain placement
/// further.
pub(crate) struct PlacementBook<'a> {
    registry: &'a EquipmentRegistry,
    held: HashMap<Id, Vec<Span>>,
    windows: &'a HashMap<Id, Vec<Span>>,
}

impl<'a> PlacementBook<'a> {
    pub fn new(registry: &'a EquipmentRegistry, windows: &'a HashMap<Id, Vec<Span>>) -> Self {
        Self {
            registry,
            held: HashMap::new(),
            windows,
        }
    }

    /// Earliest start at or after `start` where `[start, start+duration)`
    /// fits on every listed equipment at once.
    ///
    /// Advancing for one equipment can invalidate an earlier one, so the
    /// sweep loops over the whole list until no equipment moves the start.
    pub fn earliest_start(&self, equipment: &[Id], mut start: Minutes, duration: Minutes) -> Minutes {
        loop {
            let mut moved = false;
            for id in equipment {
                let fitted = self.next_fit_on(id, start, duration);
                if fitted.value() > start.value() {
                    start = fitted;
                    moved = true;
                }
            }
            if !moved {
                return start;
            }
        }
    }

    /// Earliest start on a single equipment id: first align with an
    /// availability window long enough for the task, then sweep past placed
    /// spans while the equipment is at capacity.
    fn next_fit_on(&self, id: &str, mut start: Minutes, duration: Minutes) -> Minutes {
        let capacity = self.registry.concurrency(id) as usize;
        loop {
            let aligned = self.align_to_window(id, start, duration);
            let swept = self.sweep_capacity(id, aligned, duration, capacity);
            if swept.value() == start.value() {
                return swept;
            }
            start = swept;
        }
    }

    /// Advances `start` into the next availability window that accommodates
    /// the task. With no windows registered (or none that fit), the start is
    /// returned unchanged.
    fn align_to_window(&self, id: &str, start: Minutes, duration: Minutes) -> Minutes {
        let Some(windows) = self.windows.get(id) else {
            return start;
        };
        for window in windows {
            let candidate = if window.start().value() > start.value() {
                window.start()
            } else {
                start
            };
            if candidate.value() + duration.value() <= window.end().value() {
                return candidate;
            }
        }
        start
    }

    /// While the placed spans overlapping the proposal have reached
    /// capacity, advance to the earliest end among them. Each advance passes
    /// at least one span end, so the sweep terminates.
    fn sweep_capacity(&self, id: &str, mut start: Minutes, duration: Minutes, capacity: usize) -> Minutes {
        let Some(placed) = self.held.get(id) else {
            return start;
        };
        loop {
            let proposal = Span::new(start, start + duration);
            let active: Vec<&Span> = placed.iter().filter(|span| span.overlaps(&proposal)).collect();
            if active.len() < capacity {
                return start;
            }
            let next = active
                .iter()
                .map(|span| span.end().value())
                .fold(f64::INFINITY, f64::min);
            start = Minutes::new(next);
        }
    }

    /// Records a placed span on every listed equipment.
    pub fn hold(&mut self, equipment: &[Id], span: Span) {
        for id in equipment {
            self.held.entry(id.clone()).or_default().push(span);
        }
    }

    /// Stretches the most recent hold on each listed equipment to
    /// `new_end`. Used for trailing cleanup, which extends the existing hold
    /// instead of re-acquiring the equipment.
    pub fn extend_last_hold(&mut self, equipment: &[Id], new_end: Minutes) {
        for id in equipment {
            if let Some(last) = self.held.get_mut(id).and_then(|spans| spans.last_mut()) {
                if new_end.value() > last.end().value() {
                    *last = Span::new(last.start(), new_end);
                }
            }
        }
    }
}
