//! World-level errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("unknown block name: {0}")]
    UnknownBlock(String),

    #[error("y = {y} is outside the world's vertical range [{min}, {max})")]
    OutOfRange { y: i32, min: i32, max: i32 },

    #[error("chunk ({cx}, {cz}) is not loaded")]
    ChunkNotLoaded { cx: i32, cz: i32 },

    #[error("fill region is inverted: min {min:?} > max {max:?}")]
    InvertedRegion {
        min: (i32, i32, i32),
        max: (i32, i32, i32),
    },
}
