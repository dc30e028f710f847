//! Flat world chunk generator.
//!
//! Default layout:
//! - Y = -4: Bedrock
//! - Y = -3..-2: Dirt
//! - Y = -1: Grass Block
//! - Y = 0+: Air (mobs stand with their feet at Y = 0)

use crate::block_registry::AIR;
use crate::chunk::ChunkColumn;
use crate::voxel_world::VoxelWorld;

/// Block IDs used by the default flat layout.
pub const BEDROCK: u32 = 7;
pub const DIRT: u32 = 3;
pub const GRASS_BLOCK: u32 = 2;

/// Bottom-up list of `(y, block_id)` layers.
#[derive(Debug, Clone)]
pub struct FlatLayers {
    pub layers: Vec<(i32, u32)>,
}

impl Default for FlatLayers {
    fn default() -> Self {
        Self {
            layers: vec![(-4, BEDROCK), (-3, DIRT), (-2, DIRT), (-1, GRASS_BLOCK)],
        }
    }
}

impl FlatLayers {
    /// Y of the first air cell above the top layer.
    pub fn surface_y(&self) -> i32 {
        self.layers.iter().map(|(y, _)| y + 1).max().unwrap_or(0)
    }
}

/// Generate a flat chunk column at the given chunk coordinates.
pub fn generate_flat_chunk(x: i32, z: i32, layers: &FlatLayers) -> ChunkColumn {
    let mut column = ChunkColumn::new_single(x, z, AIR);
    for &(y, block_id) in &layers.layers {
        for lx in 0..16 {
            for lz in 0..16 {
                column.set_block(lx, y, lz, block_id);
            }
        }
    }
    column
}

/// Generate a square of flat columns covering chunk coordinates `-radius..radius`.
pub fn generate_flat_world(radius_chunks: i32, layers: &FlatLayers) -> VoxelWorld {
    let mut world = VoxelWorld::new();
    for cx in -radius_chunks..radius_chunks {
        for cz in -radius_chunks..radius_chunks {
            world.insert_column(generate_flat_chunk(cx, cz, layers));
        }
    }
    world
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel_world::BlockSource;

    #[test]
    fn flat_chunk_layer_layout() {
        let col = generate_flat_chunk(0, 0, &FlatLayers::default());
        assert_eq!(col.get_block(0, -4, 0), Some(BEDROCK));
        assert_eq!(col.get_block(0, -3, 0), Some(DIRT));
        assert_eq!(col.get_block(0, -2, 0), Some(DIRT));
        assert_eq!(col.get_block(0, -1, 0), Some(GRASS_BLOCK));
        assert_eq!(col.get_block(0, 0, 0), Some(AIR));
        assert_eq!(col.get_block(0, -5, 0), Some(AIR));
    }

    #[test]
    fn surface_is_above_top_layer() {
        assert_eq!(FlatLayers::default().surface_y(), 0);
        let custom = FlatLayers {
            layers: vec![(10, BEDROCK)],
        };
        assert_eq!(custom.surface_y(), 11);
    }

    #[test]
    fn uniform_across_xz() {
        let col = generate_flat_chunk(5, -3, &FlatLayers::default());
        for x in 0..16 {
            for z in 0..16 {
                assert_eq!(col.get_block(x, -4, z), Some(BEDROCK));
                assert_eq!(col.get_block(x, -1, z), Some(GRASS_BLOCK));
            }
        }
    }

    #[test]
    fn world_covers_radius() {
        let world = generate_flat_world(2, &FlatLayers::default());
        assert_eq!(world.column_count(), 16);
        assert_eq!(world.block_id_at(-32, -1, -32), Some(GRASS_BLOCK));
        assert_eq!(world.block_id_at(31, -1, 31), Some(GRASS_BLOCK));
        assert_eq!(world.block_id_at(32, -1, 0), None);
    }
}
