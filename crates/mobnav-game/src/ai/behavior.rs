//! Behavior trait for mob AI.

use bevy_ecs::prelude::Entity;
use glam::Vec3;

use super::grid::{Cell, GridClassifier};
use crate::mob_registry::MobCategory;
use super::navigator::{PathNavigator, SteeringMode};

/// (entity, runtime_id, horizontal distance, feet position) of the nearest player.
pub type NearestPlayerInfo = (Entity, u64, f32, Vec3);

/// Read-only snapshot of the world state relevant to one mob.
pub struct BehaviorContext<'w> {
    /// Mob's feet position.
    pub mob_position: Vec3,
    /// Eye offset above the feet.
    pub mob_eye_height: f32,
    /// Mob's base movement speed (blocks/tick).
    pub mob_speed: f32,
    /// Whether the mob attacks players.
    pub mob_category: MobCategory,
    /// Whether the mob is on the ground.
    pub mob_on_ground: bool,
    /// Current game tick.
    pub current_tick: u64,
    /// Tick when this mob was last damaged.
    pub last_damage_tick: Option<u64>,
    /// Nearest player info.
    pub nearest_player: Option<NearestPlayerInfo>,
    /// How the navigator steered on the previous tick.
    pub navigation: SteeringMode,
    /// Terrain queries.
    pub grid: GridClassifier<'w>,
}

impl BehaviorContext<'_> {
    /// The cell the mob's feet are in.
    pub fn mob_cell(&self) -> Cell {
        Cell::containing(self.mob_position)
    }

    pub fn is_hostile(&self) -> bool {
        self.mob_category == MobCategory::Hostile
    }
}

/// Output actions from a behavior tick, besides whatever it did to the navigator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BehaviorOutput {
    /// Desired yaw and head_yaw rotation (degrees) when not steering.
    pub look_at: Option<(f32, f32)>,
    /// Request a jump (or swim upward) this tick.
    pub jump: bool,
    /// Attack the player with this runtime ID this tick.
    pub attack: Option<u64>,
    /// Place a block in the world.
    pub place_block: Option<(Cell, u32)>,
    /// Multiplier applied to the mob's base speed.
    pub speed_multiplier: Option<f32>,
}

/// A single behavior in a mob's priority list.
///
/// Priority is the position in the owning [`super::brain::GoalSelector`].
pub trait Behavior: Send + Sync + std::fmt::Debug {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Can this behavior start right now?
    fn can_start(&self, ctx: &BehaviorContext<'_>) -> bool;

    /// Should this behavior continue running?
    fn should_continue(&self, ctx: &BehaviorContext<'_>) -> bool {
        self.can_start(ctx)
    }

    /// Called once when the behavior activates.
    fn start(&mut self, _ctx: &BehaviorContext<'_>, _nav: &mut PathNavigator) {}

    /// Called every tick while active, including the tick it started.
    fn tick(&mut self, ctx: &BehaviorContext<'_>, nav: &mut PathNavigator) -> BehaviorOutput;

    /// Called once when the behavior deactivates.
    fn stop(&mut self) {}
}
