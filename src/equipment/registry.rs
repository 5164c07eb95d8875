use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::catalog::default_catalog;
use super::item::{Equipment, EquipmentCategory, EquipmentStatus};
use crate::Id;

/// Mutable inventory of kitchen equipment.
///
/// The registry is the only state in the engine that survives across
/// planning runs: status transitions stick until reset. It is bound to an
/// orchestrator instance, never shared globally; callers serialise
/// mutations.
///
/// Items are kept in insertion order with an id index, so iteration and
/// snapshots are deterministic. All lookups return `Option` rather than
/// failing; status updates on unknown ids report `false`.
#[derive(Debug, Clone)]
pub struct EquipmentRegistry {
    items: Vec<Equipment>,
    index: HashMap<Id, usize>,
}

/// Serializable snapshot of the full inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub equipment: Vec<Equipment>,
    pub last_updated: DateTime<Utc>,
}

impl Default for EquipmentRegistry {
    fn default() -> Self {
        Self::from_catalog(default_catalog())
    }
}

impl EquipmentRegistry {
    /// Registry stocked with the default kitchen catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry stocked from a caller-supplied catalog. A repeated id
    /// replaces the earlier entry.
    pub fn from_catalog(catalog: Vec<Equipment>) -> Self {
        let mut registry = Self {
            items: Vec::with_capacity(catalog.len()),
            index: HashMap::with_capacity(catalog.len()),
        };
        for item in catalog {
            registry.add(item);
        }
        registry
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds or replaces an item.
    pub fn add(&mut self, item: Equipment) {
        match self.index.get(&item.id).copied() {
            Some(at) => self.items[at] = item,
            None => {
                self.index.insert(item.id.clone(), self.items.len());
                self.items.push(item);
            }
        }
    }

    /// Removes an item, returning it if present.
    pub fn remove(&mut self, id: &str) -> Option<Equipment> {
        let at = self.index.remove(id)?;
        let item = self.items.remove(at);
        // Positions after the removed slot shift down by one.
        for position in self.index.values_mut() {
            if *position > at {
                *position -= 1;
            }
        }
        Some(item)
    }

    pub fn get(&self, id: &str) -> Option<&Equipment> {
        self.index.get(id).map(|&at| &self.items[at])
    }

    /// Iterates the inventory in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Equipment> {
        self.items.iter()
    }

    pub fn by_category(&self, category: EquipmentCategory) -> Vec<&Equipment> {
        self.items
            .iter()
            .filter(|item| item.category == category)
            .collect()
    }

    /// Items usable after at most a wash: clean or dirty, not in use and not
    /// out of service.
    pub fn available(&self) -> Vec<&Equipment> {
        self.items
            .iter()
            .filter(|item| {
                matches!(
                    item.status,
                    EquipmentStatus::Clean | EquipmentStatus::Dirty
                )
            })
            .collect()
    }

    pub fn clean(&self) -> Vec<&Equipment> {
        self.items
            .iter()
            .filter(|item| item.status == EquipmentStatus::Clean)
            .collect()
    }

    /// Sets the status of one item. Returns `false` for unknown ids.
    pub fn set_status(&mut self, id: &str, status: EquipmentStatus) -> bool {
        match self.index.get(id) {
            Some(&at) => {
                self.items[at].status = status;
                true
            }
            None => false,
        }
    }

    /// Resets everything to clean, except items marked unavailable.
    pub fn reset_to_clean(&mut self) {
        for item in &mut self.items {
            if item.status != EquipmentStatus::Unavailable {
                item.status = EquipmentStatus::Clean;
            }
        }
    }

    /// Resolves the alternatives declared on `id` to registry entries.
    pub fn alternatives_of(&self, id: &str) -> Vec<&Equipment> {
        self.get(id)
            .map(|item| {
                item.alternatives
                    .iter()
                    .filter_map(|alt| self.get(alt))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First *clean* alternative of `id`, if any.
    pub fn clean_alternative(&self, id: &str) -> Option<&Equipment> {
        self.alternatives_of(id)
            .into_iter()
            .find(|alt| alt.status == EquipmentStatus::Clean)
    }

    /// Slots the item currently offers; zero for unknown ids.
    pub fn available_slots(&self, id: &str) -> u32 {
        self.get(id).map(Equipment::available_slots).unwrap_or(0)
    }

    /// Concurrent capacity enforced by the scheduler and detector. Unknown
    /// equipment is treated as single-slot.
    pub fn concurrency(&self, id: &str) -> u32 {
        self.get(id).map(Equipment::concurrency).unwrap_or(1)
    }

    /// Picks a clean burner, preferring the front pair.
    pub fn allocate_burner(&self) -> Option<&Equipment> {
        let clean: Vec<&Equipment> = self
            .by_category(EquipmentCategory::Stovetop)
            .into_iter()
            .filter(|item| item.status == EquipmentStatus::Clean)
            .collect();
        clean
            .iter()
            .find(|item| item.name.to_lowercase().contains("front"))
            .copied()
            .or_else(|| clean.first().copied())
    }

    /// Serializable snapshot of the full inventory, stamped now.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            equipment: self.items.clone(),
            last_updated: Utc::now(),
        }
    }

    /// Rebuilds a registry from a snapshot.
    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Self {
        Self::from_catalog(snapshot.equipment)
    }
}
