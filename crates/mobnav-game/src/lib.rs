//! Mob simulation: ECS world, movement, and navigation AI.

pub mod ai;
pub mod components;
pub mod game_world;
pub mod mob_registry;
pub mod movement;
