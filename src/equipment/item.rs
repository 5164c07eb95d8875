use serde::{Deserialize, Serialize};

use crate::units::{minutes, Minutes};
use crate::Id;

/// Coarse equipment classification used for filtering, burner allocation and
/// cleaning-priority derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentCategory {
    Stovetop,
    Oven,
    Microwave,
    Appliance,
    Tool,
    Surface,
}

/// Lifecycle status of a piece of equipment.
///
/// Only `Clean` equipment offers slots to the scheduler; `Unavailable` items
/// are excluded even from bulk resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EquipmentStatus {
    Clean,
    Dirty,
    InUse,
    Unavailable,
}

/// One entry of the kitchen inventory.
///
/// `slots` models discrete parallel occupancy (oven racks); `capacity`
/// models how many tasks a surface hosts side by side. Either may be unset,
/// in which case the item is single-slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: Id,
    pub name: String,
    pub category: EquipmentCategory,
    pub status: EquipmentStatus,
    #[serde(with = "crate::units::minute_repr")]
    pub cleaning_time: Minutes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<Id>,
}

impl Equipment {
    pub fn new(id: impl Into<Id>, name: impl Into<String>, category: EquipmentCategory) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            status: EquipmentStatus::Clean,
            cleaning_time: minutes(0.0),
            capacity: None,
            slots: None,
            alternatives: Vec::new(),
        }
    }

    pub fn with_cleaning_time(mut self, cleaning_time: Minutes) -> Self {
        self.cleaning_time = cleaning_time;
        self
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_slots(mut self, slots: u32) -> Self {
        self.slots = Some(slots);
        self
    }

    pub fn with_alternative(mut self, alternative: impl Into<Id>) -> Self {
        self.alternatives.push(alternative.into());
        self
    }

    /// How many tasks this item can host concurrently, regardless of status:
    /// `slots`, else `capacity`, else 1. This is the capacity the scheduler
    /// and the conflict detector enforce.
    pub fn concurrency(&self) -> u32 {
        self.slots.or(self.capacity).unwrap_or(1)
    }

    /// Slots currently offered: zero unless the item is clean.
    pub fn available_slots(&self) -> u32 {
        if self.status == EquipmentStatus::Clean {
            self.concurrency()
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrency_prefers_slots_over_capacity() {
        let oven = Equipment::new("oven", "Oven", EquipmentCategory::Oven)
            .with_slots(2)
            .with_capacity(5);
        assert_eq!(oven.concurrency(), 2);
    }

    #[test]
    fn concurrency_defaults_to_one() {
        let pot = Equipment::new("pot-large", "Large Pot", EquipmentCategory::Tool);
        assert_eq!(pot.concurrency(), 1);
    }

    #[test]
    fn available_slots_zero_unless_clean() {
        let mut counter = Equipment::new("counter-main", "Main Counter", EquipmentCategory::Surface)
            .with_capacity(4);
        assert_eq!(counter.available_slots(), 4);
        counter.status = EquipmentStatus::Dirty;
        assert_eq!(counter.available_slots(), 0);
        counter.status = EquipmentStatus::InUse;
        assert_eq!(counter.available_slots(), 0);
        counter.status = EquipmentStatus::Unavailable;
        assert_eq!(counter.available_slots(), 0);
    }

    #[test]
    fn serde_round_trip_flat_minutes() {
        let wok = Equipment::new("wok", "Wok", EquipmentCategory::Tool)
            .with_cleaning_time(minutes(5.0))
            .with_alternative("skillet-large");
        let json = serde_json::to_string(&wok).unwrap();
        assert!(json.contains(r#""cleaning_time":5.0"#));
        assert!(json.contains(r#""status":"clean""#));
        let back: Equipment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, wok);
    }

    #[test]
    fn status_serde_kebab_case() {
        let json = serde_json::to_string(&EquipmentStatus::InUse).unwrap();
        assert_eq!(json, r#""in-use""#);
    }
}
