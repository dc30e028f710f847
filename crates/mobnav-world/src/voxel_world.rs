//! In-memory chunked voxel world and the read-only block query interface.

use std::collections::HashMap;

use crate::block_registry::AIR;
use crate::chunk::{ChunkColumn, MAX_Y, MIN_Y};
use crate::error::WorldError;

/// Read-only per-coordinate block lookup.
///
/// Returns `None` for coordinates the source does not hold (unloaded columns,
/// Y outside the vertical range). Callers treat `None` as non-solid and
/// non-standable.
pub trait BlockSource: Send + Sync {
    fn block_id_at(&self, x: i32, y: i32, z: i32) -> Option<u32>;
}

/// A set of loaded chunk columns keyed by chunk coordinates.
#[derive(Default, Clone)]
pub struct VoxelWorld {
    columns: HashMap<(i32, i32), ChunkColumn>,
}

impl VoxelWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a chunk column.
    pub fn insert_column(&mut self, column: ChunkColumn) {
        self.columns.insert((column.x, column.z), column);
    }

    /// Whether the column containing block `(x, z)` is loaded.
    pub fn is_loaded(&self, x: i32, z: i32) -> bool {
        self.columns.contains_key(&chunk_coords(x, z))
    }

    /// Number of loaded columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Set a single block.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block_id: u32) -> Result<(), WorldError> {
        let (cx, cz) = chunk_coords(x, z);
        let column = self
            .columns
            .get_mut(&(cx, cz))
            .ok_or(WorldError::ChunkNotLoaded { cx, cz })?;
        if column.set_block(local(x), y, local(z), block_id) {
            Ok(())
        } else {
            Err(WorldError::OutOfRange {
                y,
                min: MIN_Y,
                max: MAX_Y,
            })
        }
    }

    /// Fill the inclusive box `min..=max` with one block.
    pub fn fill(
        &mut self,
        min: (i32, i32, i32),
        max: (i32, i32, i32),
        block_id: u32,
    ) -> Result<(), WorldError> {
        if min.0 > max.0 || min.1 > max.1 || min.2 > max.2 {
            return Err(WorldError::InvertedRegion { min, max });
        }
        for x in min.0..=max.0 {
            for y in min.1..=max.1 {
                for z in min.2..=max.2 {
                    self.set_block(x, y, z, block_id)?;
                }
            }
        }
        Ok(())
    }

    /// Clear the inclusive box `min..=max` to air.
    pub fn clear(&mut self, min: (i32, i32, i32), max: (i32, i32, i32)) -> Result<(), WorldError> {
        self.fill(min, max, AIR)
    }
}

impl BlockSource for VoxelWorld {
    fn block_id_at(&self, x: i32, y: i32, z: i32) -> Option<u32> {
        let column = self.columns.get(&chunk_coords(x, z))?;
        column.get_block(local(x), y, local(z))
    }
}

/// Chunk coordinates of the column containing block `(x, z)`.
pub fn chunk_coords(x: i32, z: i32) -> (i32, i32) {
    (x.div_euclid(16), z.div_euclid(16))
}

fn local(v: i32) -> usize {
    v.rem_euclid(16) as usize
}
