//! Block property registry mapping numeric block IDs to block info.
//!
//! Provides solidity and liquid classification for every block the terrain
//! can hold. ID 0 is always air. Unknown IDs default to solid, non-liquid.

use std::collections::HashMap;

/// Numeric ID of the air block.
pub const AIR: u32 = 0;

/// Liquid classification of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LiquidKind {
    #[default]
    None,
    Water,
    Lava,
}

impl LiquidKind {
    pub fn is_liquid(self) -> bool {
        self != LiquidKind::None
    }
}

/// Properties for a single block type.
#[derive(Debug, Clone)]
pub struct BlockInfo {
    /// Numeric block ID stored in chunk palettes.
    pub id: u32,
    /// Namespaced block identifier, e.g. `"minecraft:stone"`.
    pub name: &'static str,
    /// Whether entities collide with this block.
    pub is_solid: bool,
    /// Liquid classification.
    pub liquid: LiquidKind,
}

/// Registry mapping block IDs (and names) to block info.
pub struct BlockRegistry {
    blocks: HashMap<u32, &'static BlockInfo>,
    by_name: HashMap<&'static str, u32>,
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockRegistry {
    /// Build the registry from the static block table.
    pub fn new() -> Self {
        let mut blocks = HashMap::with_capacity(BLOCK_DATA.len());
        let mut by_name = HashMap::with_capacity(BLOCK_DATA.len());
        for info in BLOCK_DATA {
            blocks.insert(info.id, info);
            by_name.insert(info.name, info.id);
        }
        Self { blocks, by_name }
    }

    /// Look up full block info by ID.
    pub fn get(&self, id: u32) -> Option<&'static BlockInfo> {
        self.blocks.get(&id).copied()
    }

    /// Resolve a namespaced name to its block ID.
    pub fn id_by_name(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    /// Check if a block is solid. Air is never solid; unknown IDs default to `true`.
    pub fn is_solid(&self, id: u32) -> bool {
        if id == AIR {
            return false;
        }
        self.blocks
            .get(&id)
            .map(|info| info.is_solid)
            .unwrap_or(true)
    }

    /// Liquid classification. Unknown IDs are not liquid.
    pub fn liquid(&self, id: u32) -> LiquidKind {
        self.blocks
            .get(&id)
            .map(|info| info.liquid)
            .unwrap_or_default()
    }

    /// Number of registered block types.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

macro_rules! block {
    ($id:expr, $name:expr, solid) => {
        BlockInfo {
            id: $id,
            name: $name,
            is_solid: true,
            liquid: LiquidKind::None,
        }
    };
    ($id:expr, $name:expr, non_solid) => {
        BlockInfo {
            id: $id,
            name: $name,
            is_solid: false,
            liquid: LiquidKind::None,
        }
    };
    ($id:expr, $name:expr, liquid $kind:ident) => {
        BlockInfo {
            id: $id,
            name: $name,
            is_solid: false,
            liquid: LiquidKind::$kind,
        }
    };
}

/// Static block table. IDs follow the classic numeric layout.
static BLOCK_DATA: &[BlockInfo] = &[
    // ===== Special =====
    block!(0, "minecraft:air", non_solid),
    block!(7, "minecraft:bedrock", solid),
    block!(166, "minecraft:barrier", solid),
    // ===== Terrain =====
    block!(1, "minecraft:stone", solid),
    block!(2, "minecraft:grass_block", solid),
    block!(3, "minecraft:dirt", solid),
    block!(4, "minecraft:cobblestone", solid),
    block!(12, "minecraft:sand", solid),
    block!(13, "minecraft:gravel", solid),
    block!(24, "minecraft:sandstone", solid),
    block!(80, "minecraft:snow", solid),
    block!(82, "minecraft:clay", solid),
    // ===== Wood =====
    block!(5, "minecraft:oak_planks", solid),
    block!(17, "minecraft:oak_log", solid),
    block!(18, "minecraft:oak_leaves", solid),
    block!(85, "minecraft:oak_fence", solid),
    // ===== Building =====
    block!(20, "minecraft:glass", solid),
    block!(45, "minecraft:bricks", solid),
    block!(98, "minecraft:stone_bricks", solid),
    // ===== Decoration (pass-through) =====
    block!(6, "minecraft:oak_sapling", non_solid),
    block!(31, "minecraft:short_grass", non_solid),
    block!(37, "minecraft:dandelion", non_solid),
    block!(38, "minecraft:poppy", non_solid),
    block!(50, "minecraft:torch", non_solid),
    block!(78, "minecraft:snow_layer", non_solid),
    // ===== Liquids =====
    block!(8, "minecraft:flowing_water", liquid Water),
    block!(9, "minecraft:water", liquid Water),
    block!(10, "minecraft:flowing_lava", liquid Lava),
    block!(11, "minecraft:lava", liquid Lava),
];
