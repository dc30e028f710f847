//! Kinematic mob movement: gravity, drag, jumping and voxel collision.
//!
//! Bodies are treated as a vertical column of cells at their feet position.
//! Each axis is moved separately so a wall stops only the blocked axis.

use glam::Vec3;

use crate::ai::grid::{Cell, GridClassifier};
use crate::ai::pathfinding::direction_from_yaw;
use crate::components::MovementIntent;

/// Downward acceleration per tick.
pub const GRAVITY: f32 = 0.08;

/// Vertical velocity multiplier per tick in air.
pub const AIR_DRAG: f32 = 0.98;

/// Upward velocity of a jump from the ground.
pub const JUMP_VELOCITY: f32 = 0.42;

/// Upward velocity while swimming.
pub const SWIM_VELOCITY: f32 = 0.1;

/// Horizontal velocity multiplier per tick when not walking.
pub const FRICTION: f32 = 0.6;

/// Maximum vertical distance per tick; keeps a fall from skipping a floor cell.
pub const MAX_FALL_PER_TICK: f32 = 0.9;

/// Mutable kinematic state of one body.
#[derive(Debug, Clone, Copy)]
pub struct Body {
    /// Feet position.
    pub position: Vec3,
    pub velocity: Vec3,
    pub on_ground: bool,
    pub height: f32,
}

/// Advance a body by one tick.
pub fn step(body: &mut Body, intent: &MovementIntent, yaw: f32, grid: &GridClassifier<'_>) {
    let in_liquid = grid.liquid(Cell::containing(body.position));

    if intent.forward {
        let dir = direction_from_yaw(yaw) * intent.speed;
        body.velocity.x = dir.x;
        body.velocity.z = dir.z;
    } else {
        body.velocity.x = damp(body.velocity.x * FRICTION);
        body.velocity.z = damp(body.velocity.z * FRICTION);
    }

    if intent.jump {
        if in_liquid {
            body.velocity.y = body.velocity.y.max(SWIM_VELOCITY);
        } else if body.on_ground {
            body.velocity.y = JUMP_VELOCITY;
        }
    }

    // Horizontal, one axis at a time
    let moved_x = body.position + Vec3::X * body.velocity.x;
    if blocked(grid, moved_x, body.height) {
        body.velocity.x = 0.0;
    } else {
        body.position = moved_x;
    }
    let moved_z = body.position + Vec3::Z * body.velocity.z;
    if blocked(grid, moved_z, body.height) {
        body.velocity.z = 0.0;
    } else {
        body.position = moved_z;
    }

    // Vertical
    let next_y = body.position.y + body.velocity.y;
    if body.velocity.y <= 0.0 {
        let floor = Cell::containing(Vec3::new(body.position.x, next_y, body.position.z));
        if grid.solid(floor) {
            body.position.y = (floor.y + 1) as f32;
            body.velocity.y = 0.0;
            body.on_ground = true;
        } else {
            body.position.y = next_y;
            body.on_ground = false;
        }
    } else {
        let head = Vec3::new(body.position.x, next_y + body.height, body.position.z);
        if grid.solid(Cell::containing(head)) {
            body.velocity.y = 0.0;
        } else {
            body.position.y = next_y;
        }
        body.on_ground = false;
    }

    body.velocity.y = if in_liquid {
        (body.velocity.y - GRAVITY / 4.0) * 0.8
    } else {
        (body.velocity.y - GRAVITY) * AIR_DRAG
    }
    .max(-MAX_FALL_PER_TICK);
}

/// Any cell overlapped by a body of `height` standing at `feet` is solid.
fn blocked(grid: &GridClassifier<'_>, feet: Vec3, height: f32) -> bool {
    let base = Cell::containing(feet);
    let top = (feet.y + height - 0.001).floor() as i32;
    (base.y..=top).any(|y| grid.solid(Cell::new(base.x, y, base.z)))
}

fn damp(v: f32) -> f32 {
    if v.abs() < 0.003 {
        0.0
    } else {
        v
    }
}
