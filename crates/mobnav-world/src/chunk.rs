//! Chunk and sub-chunk data structures.

/// Sub-chunks per column: Y range [-64, 64) = 128 blocks / 16 = 8.
pub const SUB_CHUNK_COUNT: usize = 8;

/// Minimum Y coordinate held by a column.
pub const MIN_Y: i32 = -64;

/// One past the maximum Y coordinate held by a column.
pub const MAX_Y: i32 = MIN_Y + (SUB_CHUNK_COUNT as i32) * 16;

/// A 16x16x16 sub-chunk with a single block storage layer.
#[derive(Clone)]
pub struct SubChunk {
    /// Palette indices for each block, stored in XZY order: `(x*16 + z)*16 + y`.
    pub blocks: [u16; 4096],
    /// Palette of block IDs.
    pub palette: Vec<u32>,
}

/// A full chunk column (16 x 128 x 16).
#[derive(Clone)]
pub struct ChunkColumn {
    pub x: i32,
    pub z: i32,
    pub sub_chunks: [SubChunk; SUB_CHUNK_COUNT],
}

impl SubChunk {
    /// Create a sub-chunk filled entirely with a single block.
    pub fn new_single(block_id: u32) -> Self {
        Self {
            blocks: [0; 4096],
            palette: vec![block_id],
        }
    }

    /// Set a block at local coordinates within this sub-chunk.
    /// `x`, `y`, `z` must each be in `[0, 15]`.
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, block_id: u32) {
        debug_assert!(x < 16 && y < 16 && z < 16);
        let palette_index = match self.palette.iter().position(|&id| id == block_id) {
            Some(idx) => idx,
            None => {
                self.palette.push(block_id);
                self.palette.len() - 1
            }
        };
        let block_index = (x * 16 + z) * 16 + y;
        self.blocks[block_index] = palette_index as u16;
    }

    /// Get the ID of the block at local coordinates.
    pub fn get_block(&self, x: usize, y: usize, z: usize) -> u32 {
        let block_index = (x * 16 + z) * 16 + y;
        let palette_index = self.blocks[block_index] as usize;
        self.palette[palette_index]
    }
}

impl ChunkColumn {
    /// Create a column filled with a single block.
    pub fn new_single(x: i32, z: i32, block_id: u32) -> Self {
        Self {
            x,
            z,
            sub_chunks: std::array::from_fn(|_| SubChunk::new_single(block_id)),
        }
    }

    /// Get the block at column-local `(x, z)` and world `y`.
    /// Returns `None` when `y` is outside [`MIN_Y`, `MAX_Y`).
    pub fn get_block(&self, x: usize, y: i32, z: usize) -> Option<u32> {
        let (index, local_y) = sub_chunk_slot(y)?;
        Some(self.sub_chunks[index].get_block(x, local_y, z))
    }

    /// Set the block at column-local `(x, z)` and world `y`.
    /// Returns `false` when `y` is outside the column.
    pub fn set_block(&mut self, x: usize, y: i32, z: usize, block_id: u32) -> bool {
        match sub_chunk_slot(y) {
            Some((index, local_y)) => {
                self.sub_chunks[index].set_block(x, local_y, z, block_id);
                true
            }
            None => false,
        }
    }
}

/// Map a world Y to `(sub_chunk_index, local_y)`.
fn sub_chunk_slot(y: i32) -> Option<(usize, usize)> {
    if !(MIN_Y..MAX_Y).contains(&y) {
        return None;
    }
    let offset = (y - MIN_Y) as usize;
    Some((offset / 16, offset % 16))
}
