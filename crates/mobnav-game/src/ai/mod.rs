//! Mob AI: grid classification, pathfinding, steering, and behavior selection.

pub mod behavior;
pub mod behaviors;
pub mod brain;
pub mod grid;
pub mod mob_behaviors;
pub mod navigator;
pub mod pathfinding;
pub mod system;
