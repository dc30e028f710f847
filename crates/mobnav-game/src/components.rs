//! ECS components for all entities (players and mobs).

use bevy_ecs::prelude::*;
use glam::Vec3;

/// Identity for an entity.
#[derive(Component, Debug, Clone)]
pub struct EntityId {
    pub unique_id: i64,
    pub runtime_id: u64,
}

/// Feet position in the world.
#[derive(Component, Debug, Clone, Copy)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn vec(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

impl From<Vec3> for Position {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

/// Rotation angles in degrees.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Rotation {
    pub pitch: f32,
    pub yaw: f32,
    pub head_yaw: f32,
}

/// Velocity vector (blocks/tick).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Health points.
#[derive(Component, Debug, Clone, Copy)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

/// Whether the entity is standing on the ground.
#[derive(Component, Debug, Clone, Copy)]
pub struct OnGround(pub bool);

/// Axis-aligned bounding box dimensions.
#[derive(Component, Debug, Clone, Copy)]
pub struct BoundingBox {
    pub width: f32,
    pub height: f32,
}

/// Eye offset above the feet.
#[derive(Component, Debug, Clone, Copy)]
pub struct EyeHeight(pub f32);

/// The type identifier string, e.g. `"minecraft:zombie"`.
#[derive(Component, Debug, Clone)]
pub struct MobType(pub String);

/// Base attack damage dealt by this mob.
#[derive(Component, Debug, Clone, Copy)]
pub struct AttackDamage(pub f32);

/// Tick when this entity last took damage (invulnerability frames).
#[derive(Component, Debug, Clone, Copy)]
pub struct LastDamageTick(pub Option<u64>);

/// Marker: this entity is a mob (non-player).
#[derive(Component, Debug)]
pub struct Mob;

/// Marker: this entity is a player.
#[derive(Component, Debug)]
pub struct Player;

/// Marker: this entity is dead (pending cleanup).
#[derive(Component, Debug)]
pub struct Dead;

/// Base movement speed in blocks/tick (copied from MobDefinition at spawn time).
#[derive(Component, Debug, Clone, Copy)]
pub struct MovementSpeed(pub f32);

/// What the AI asked the body to do this tick. Read by the movement integrator.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct MovementIntent {
    /// Walk along the current body yaw.
    pub forward: bool,
    /// Jump if grounded, swim up if in liquid.
    pub jump: bool,
    /// Horizontal speed (blocks/tick) while walking.
    pub speed: f32,
}
