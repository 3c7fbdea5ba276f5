//! Row-block partitioning for multithreaded rendering.
//!
//! Divides the image into horizontal bands of rows (blocks) that workers
//! render independently. A block is the unit of visibility: its pixels are
//! only handed back once the whole band is finished.

use crate::renderer::{render_pixel, to_display};
use crate::{Camera, Color, Scene};
use rand::RngCore;

/// Default number of rows per block.
pub const DEFAULT_BLOCK_ROWS: u32 = 16;

/// A contiguous band of image rows, `[row_start, row_end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBlock {
    /// Position of this block in dispatch order
    pub index: usize,
    /// First row of the block
    pub row_start: u32,
    /// One past the last row of the block
    pub row_end: u32,
    /// Number of pixels in each row
    pub column_count: u32,
}

impl RowBlock {
    /// Create a new block.
    pub fn new(index: usize, row_start: u32, row_end: u32, column_count: u32) -> Self {
        debug_assert!(row_start < row_end, "empty block {}..{}", row_start, row_end);
        Self {
            index,
            row_start,
            row_end,
            column_count,
        }
    }

    /// Number of rows in the block.
    pub fn row_count(&self) -> u32 {
        self.row_end - self.row_start
    }

    /// Get the total number of pixels in this block.
    pub fn pixel_count(&self) -> usize {
        self.row_count() as usize * self.column_count as usize
    }
}

/// Split `[0, height)` into blocks of `rows_per_block` rows.
///
/// The partition is exact: blocks are contiguous, never overlap, and the
/// last one takes whatever rows are left, so it may be shorter. A block
/// size of zero is treated as one.
pub fn generate_blocks(width: u32, height: u32, rows_per_block: u32) -> Vec<RowBlock> {
    let rows_per_block = rows_per_block.max(1);
    let count = height.div_ceil(rows_per_block) as usize;
    let mut blocks = Vec::with_capacity(count);

    let mut row_start = 0;
    while row_start < height {
        let row_end = row_start.saturating_add(rows_per_block).min(height);
        blocks.push(RowBlock::new(blocks.len(), row_start, row_end, width));
        row_start = row_end;
    }

    blocks
}

/// Result of rendering a block.
#[derive(Debug, Clone)]
pub struct BlockResult {
    /// The block that was rendered
    pub block: RowBlock,
    /// `(linear pixel index, display color)` for every pixel of the block
    pub pixels: Vec<(usize, Color)>,
}

/// Render every pixel of a block.
///
/// Colors are averaged over the camera's samples, gamma-encoded and clamped,
/// ready for quantization.
pub fn render_block(
    block: &RowBlock,
    camera: &Camera,
    scene: &Scene,
    rng: &mut dyn RngCore,
) -> BlockResult {
    let mut pixels = Vec::with_capacity(block.pixel_count());
    let width = block.column_count as usize;

    for j in block.row_start..block.row_end {
        for i in 0..block.column_count {
            let color = render_pixel(camera, scene, i, j, rng);
            let index = j as usize * width + i as usize;
            pixels.push((index, to_display(color)));
        }
    }

    BlockResult {
        block: *block,
        pixels,
    }
}
