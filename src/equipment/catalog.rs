//! Default kitchen catalog.
//!
//! A reasonably equipped home kitchen: four burners (front pair preferred by
//! the allocator), a two-rack oven, counter appliances with substitution
//! links, cookware, hand tools and two work surfaces. Callers with a
//! different kitchen hand their own list to the registry instead.

use super::{Equipment, EquipmentCategory};
use crate::units::minutes;

use EquipmentCategory::{Appliance, Microwave, Oven, Stovetop, Surface, Tool};

pub fn default_catalog() -> Vec<Equipment> {
    vec![
        // Stovetop
        Equipment::new("burner-1", "Front Left Burner", Stovetop).with_cleaning_time(minutes(2.0)),
        Equipment::new("burner-2", "Front Right Burner", Stovetop).with_cleaning_time(minutes(2.0)),
        Equipment::new("burner-3", "Back Left Burner", Stovetop).with_cleaning_time(minutes(2.0)),
        Equipment::new("burner-4", "Back Right Burner", Stovetop).with_cleaning_time(minutes(2.0)),
        // Oven
        Equipment::new("oven", "Oven", Oven)
            .with_slots(2)
            .with_cleaning_time(minutes(5.0)),
        Equipment::new("oven-rack-1", "Oven Rack (Upper)", Oven).with_cleaning_time(minutes(15.0)),
        Equipment::new("oven-rack-2", "Oven Rack (Lower)", Oven).with_cleaning_time(minutes(15.0)),
        Equipment::new("microwave", "Microwave", Microwave).with_cleaning_time(minutes(3.0)),
        // Counter appliances
        Equipment::new("instant-pot", "Instant Pot", Appliance)
            .with_alternative("dutch-oven")
            .with_cleaning_time(minutes(8.0)),
        Equipment::new("rice-cooker", "Rice Cooker", Appliance)
            .with_alternative("pot-large")
            .with_cleaning_time(minutes(4.0)),
        Equipment::new("air-fryer", "Air Fryer", Appliance)
            .with_alternative("oven")
            .with_cleaning_time(minutes(5.0)),
        Equipment::new("blender", "Blender", Appliance).with_cleaning_time(minutes(4.0)),
        Equipment::new("food-processor", "Food Processor", Appliance)
            .with_alternative("blender")
            .with_cleaning_time(minutes(5.0)),
        // Cookware
        Equipment::new("pot-large", "Large Pot", Tool).with_cleaning_time(minutes(5.0)),
        Equipment::new("pot-medium", "Medium Pot", Tool).with_cleaning_time(minutes(4.0)),
        Equipment::new("pot-small", "Small Pot", Tool).with_cleaning_time(minutes(3.0)),
        Equipment::new("dutch-oven", "Dutch Oven", Tool).with_cleaning_time(minutes(6.0)),
        Equipment::new("skillet-large", "Large Skillet", Tool).with_cleaning_time(minutes(4.0)),
        Equipment::new("skillet-medium", "Medium Skillet", Tool).with_cleaning_time(minutes(4.0)),
        Equipment::new("wok", "Wok", Tool)
            .with_alternative("skillet-large")
            .with_cleaning_time(minutes(5.0)),
        Equipment::new("sheet-pan-1", "Sheet Pan", Tool).with_cleaning_time(minutes(3.0)),
        Equipment::new("sheet-pan-2", "Sheet Pan (Spare)", Tool).with_cleaning_time(minutes(3.0)),
        Equipment::new("baking-dish", "Baking Dish", Tool).with_cleaning_time(minutes(10.0)),
        // Hand tools
        Equipment::new("cutting-board-1", "Cutting Board", Tool).with_cleaning_time(minutes(2.0)),
        Equipment::new("cutting-board-2", "Cutting Board (Spare)", Tool)
            .with_cleaning_time(minutes(2.0)),
        Equipment::new("mixing-bowl-large", "Large Mixing Bowl", Tool)
            .with_cleaning_time(minutes(2.0)),
        Equipment::new("mixing-bowl-medium", "Medium Mixing Bowl", Tool)
            .with_cleaning_time(minutes(2.0)),
        Equipment::new("colander", "Colander", Tool).with_cleaning_time(minutes(2.0)),
        Equipment::new("strainer", "Strainer", Tool).with_cleaning_time(minutes(2.0)),
        // Surfaces
        Equipment::new("counter-main", "Main Counter", Surface)
            .with_capacity(4)
            .with_cleaning_time(minutes(2.0)),
        Equipment::new("counter-prep", "Prep Counter", Surface)
            .with_capacity(2)
            .with_cleaning_time(minutes(2.0)),
    ]
}
