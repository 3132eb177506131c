//! Consolidation of `crop` directives.
//!
//! All crops are merged into one net crop whose offsets are relative to the
//! source frame, so the chain carries a single `crop` filter.

use crate::descriptor::{MediaDescriptor, Resolution};
use crate::error::{CompileError, Result};
use crate::node::{CommandNode, CropParams, CropSide, OptimizedCropParams};

/// Running per-edge crop totals, in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CropAccumulator {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
    /// A zero-size crop asked for automatic border detection
    pub detect: bool,
}

impl CropAccumulator {
    pub fn add(&mut self, crop: &CropParams) {
        let size = crop.size;
        if size == 0 {
            self.detect = true;
        }
        let (left, right, top, bottom) = match crop.side {
            CropSide::Left => (size, 0, 0, 0),
            CropSide::Right => (0, size, 0, 0),
            CropSide::Top => (0, 0, size, 0),
            CropSide::Bottom => (0, 0, 0, size),
            CropSide::Width => (size, size, 0, 0),
            CropSide::Height => (0, 0, size, size),
            CropSide::Each => (size, size, size, size),
        };
        self.left = self.left.saturating_add(left);
        self.right = self.right.saturating_add(right);
        self.top = self.top.saturating_add(top);
        self.bottom = self.bottom.saturating_add(bottom);
    }

    /// Fail when the totals leave no pixels on either axis
    pub fn check_bounds(&self, resolution: Resolution) -> Result<()> {
        if u64::from(self.left) + u64::from(self.right) >= u64::from(resolution.width) {
            return Err(CompileError::CropExceedsFrame {
                axis: "width",
                first_edge: "left",
                first: self.left,
                second_edge: "right",
                second: self.right,
                dimension: resolution.width,
            });
        }
        if u64::from(self.top) + u64::from(self.bottom) >= u64::from(resolution.height) {
            return Err(CompileError::CropExceedsFrame {
                axis: "height",
                first_edge: "top",
                first: self.top,
                second_edge: "bottom",
                second: self.bottom,
                dimension: resolution.height,
            });
        }
        Ok(())
    }

    /// True when no edge is cropped by a single pixel
    pub fn is_zero(&self) -> bool {
        self.left == 0 && self.right == 0 && self.top == 0 && self.bottom == 0
    }

    fn into_node(self) -> CommandNode {
        CommandNode::OptimizedCrop(OptimizedCropParams {
            left: self.left,
            right: self.right,
            top: self.top,
            bottom: self.bottom,
            detect: self.detect,
        })
    }
}

/// Replace two or more crop nodes with a single `OptimizedCrop`.
///
/// A lone crop node is left in place. With a known resolution every crop is
/// bounds-checked, and exceeding a dimension aborts the compile.
pub fn optimize_crops(
    nodes: Vec<CommandNode>,
    descriptor: Option<&MediaDescriptor>,
) -> Result<Vec<CommandNode>> {
    let mut accumulator = CropAccumulator::default();
    let mut crop_count = 0;
    for node in &nodes {
        if let CommandNode::Crop(crop) = node {
            accumulator.add(crop);
            crop_count += 1;
        }
    }

    if crop_count == 0 {
        return Ok(nodes);
    }

    if let Some(resolution) = descriptor.and_then(|d| d.resolution) {
        accumulator.check_bounds(resolution)?;
    }

    if crop_count == 1 {
        return Ok(nodes);
    }

    log::debug!(
        "Merged {} crop directives into left={} right={} top={} bottom={} detect={}",
        crop_count,
        accumulator.left,
        accumulator.right,
        accumulator.top,
        accumulator.bottom,
        accumulator.detect
    );

    let mut optimized = Vec::with_capacity(nodes.len() - crop_count + 1);
    optimized.push(accumulator.into_node());
    optimized.extend(
        nodes
            .into_iter()
            .filter(|n| !matches!(n, CommandNode::Crop(_))),
    );
    Ok(optimized)
}
