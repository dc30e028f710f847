//! Voxel cell coordinates and per-cell walkability predicates.

use glam::Vec3;
use mobnav_world::{BlockRegistry, BlockSource, AIR};

/// An integer voxel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The cell containing a world position.
    pub fn containing(pos: Vec3) -> Self {
        Self {
            x: pos.x.floor() as i32,
            y: pos.y.floor() as i32,
            z: pos.z.floor() as i32,
        }
    }

    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    pub const fn above(self) -> Self {
        self.offset(0, 1, 0)
    }

    pub const fn below(self) -> Self {
        self.offset(0, -1, 0)
    }

    /// Position of the cell's floor center, where a mob standing in it has its feet.
    pub fn floor_center(self) -> Vec3 {
        Vec3::new(self.x as f32 + 0.5, self.y as f32, self.z as f32 + 0.5)
    }

    /// Manhattan (L1) distance between two cells.
    pub fn manhattan(self, other: Cell) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs() + (self.z - other.z).abs()
    }
}

/// Read-only view answering "solid?", "liquid?", "standable?" for cells.
#[derive(Clone, Copy)]
pub struct GridClassifier<'w> {
    blocks: &'w dyn BlockSource,
    registry: &'w BlockRegistry,
}

impl<'w> GridClassifier<'w> {
    pub fn new(blocks: &'w dyn BlockSource, registry: &'w BlockRegistry) -> Self {
        Self { blocks, registry }
    }

    /// True iff the cell holds a non-air block flagged solid. Out of bounds is never solid.
    pub fn solid(&self, cell: Cell) -> bool {
        match self.blocks.block_id_at(cell.x, cell.y, cell.z) {
            Some(AIR) | None => false,
            Some(id) => self.registry.is_solid(id),
        }
    }

    /// True iff the cell holds water or lava.
    pub fn liquid(&self, cell: Cell) -> bool {
        self.blocks
            .block_id_at(cell.x, cell.y, cell.z)
            .map(|id| self.registry.liquid(id).is_liquid())
            .unwrap_or(false)
    }

    /// Room for feet and head, solid non-liquid support below, all in bounds.
    pub fn standable(&self, cell: Cell) -> bool {
        let (Some(feet), Some(head), Some(ground)) = (
            self.block_id_at(cell),
            self.block_id_at(cell.above()),
            self.block_id_at(cell.below()),
        ) else {
            return false;
        };
        self.passable(feet) && self.passable(head) && self.supports(ground)
    }

    fn block_id_at(&self, cell: Cell) -> Option<u32> {
        self.blocks.block_id_at(cell.x, cell.y, cell.z)
    }

    fn passable(&self, id: u32) -> bool {
        id == AIR || (!self.registry.is_solid(id) && !self.registry.liquid(id).is_liquid())
    }

    fn supports(&self, id: u32) -> bool {
        id != AIR && self.registry.is_solid(id) && !self.registry.liquid(id).is_liquid()
    }
}
