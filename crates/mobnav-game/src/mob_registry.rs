//! Mob type table: stats, hitbox, eye height and whether the type attacks players.

use bevy_ecs::prelude::Component;

/// Whether a mob attacks players. Stored on each spawned mob.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MobCategory {
    Passive,
    Hostile,
}

/// Definition of a mob type.
#[derive(Debug, Clone)]
pub struct MobDefinition {
    pub type_id: &'static str,
    pub category: MobCategory,
    pub max_health: f32,
    /// Damage per melee hit.
    pub attack_damage: f32,
    /// Walking speed (blocks/tick).
    pub movement_speed: f32,
    pub bb_width: f32,
    pub bb_height: f32,
    /// Eye offset above the feet, used for line-of-sight checks.
    pub eye_height: f32,
}

const MOBS: &[MobDefinition] = &[
    MobDefinition {
        type_id: "minecraft:zombie",
        category: MobCategory::Hostile,
        max_health: 20.0,
        attack_damage: 3.0,
        movement_speed: 0.23,
        bb_width: 0.6,
        bb_height: 1.95,
        eye_height: 1.74,
    },
    MobDefinition {
        type_id: "minecraft:skeleton",
        category: MobCategory::Hostile,
        max_health: 20.0,
        attack_damage: 2.0,
        movement_speed: 0.25,
        bb_width: 0.6,
        bb_height: 1.99,
        eye_height: 1.74,
    },
    MobDefinition {
        type_id: "minecraft:cow",
        category: MobCategory::Passive,
        max_health: 10.0,
        attack_damage: 0.0,
        movement_speed: 0.2,
        bb_width: 0.9,
        bb_height: 1.4,
        eye_height: 1.3,
    },
    MobDefinition {
        type_id: "minecraft:pig",
        category: MobCategory::Passive,
        max_health: 10.0,
        attack_damage: 0.0,
        movement_speed: 0.25,
        bb_width: 0.9,
        bb_height: 0.9,
        eye_height: 0.6,
    },
    MobDefinition {
        type_id: "minecraft:chicken",
        category: MobCategory::Passive,
        max_health: 4.0,
        attack_damage: 0.0,
        movement_speed: 0.25,
        bb_width: 0.4,
        bb_height: 0.7,
        eye_height: 0.644,
    },
];

/// Look up a mob type by its identifier.
pub fn lookup(type_id: &str) -> Option<&'static MobDefinition> {
    MOBS.iter().find(|m| m.type_id == type_id)
}
