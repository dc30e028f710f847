//! World management: block registry, chunked voxel storage, and flat generation.

pub mod block_registry;
pub mod chunk;
pub mod error;
pub mod flat_generator;
pub mod voxel_world;

pub use block_registry::{BlockInfo, BlockRegistry, LiquidKind, AIR};
pub use error::WorldError;
pub use voxel_world::{BlockSource, VoxelWorld};
