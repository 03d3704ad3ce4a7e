//! The frame partition both sides derive independently.
//!
//! The wire carries no frame count: the receiver recomputes the exact plan
//! the sender used from the header-declared element count and element size.
//! The arithmetic here is therefore protocol, not policy — changing it
//! breaks compatibility with every existing peer.

/// Arrays below this element count are always sent as one frame.
pub const SINGLE_FRAME_ELEMENT_LIMIT: usize = 1024;

/// One contiguous sub-range of an array's elements, transferred as exactly
/// one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// Element offset of this block within the array.
    pub offset: usize,
    /// Element length of this block.
    pub len: usize,
}

impl Block {
    /// Byte range of this block, given the element size.
    pub fn byte_range(&self, element_size: usize) -> std::ops::Range<usize> {
        let start = self.offset * element_size;
        start..start + self.len * element_size
    }
}

/// How a typed buffer is split into frames.
///
/// Small arrays (`element_count < 1024`) and single-byte arrays go out as
/// one frame. Everything else is partitioned into `element_size` blocks:
/// the first `element_size - 1` of `ceil(n / element_size)` elements each,
/// and a final block holding the remainder. This bounds every frame to
/// roughly `n` bytes whatever the element size, with a fixed,
/// type-size-driven split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    element_count: usize,
    element_size: usize,
}

impl ChunkPlan {
    /// Compute the plan for `element_count` elements of `element_size`
    /// bytes each.
    pub fn new(element_count: usize, element_size: usize) -> Self {
        debug_assert!(matches!(element_size, 1 | 2 | 4 | 8));
        Self {
            element_count,
            element_size,
        }
    }

    /// Whether the whole array travels as a single frame.
    pub fn is_single_frame(&self) -> bool {
        self.element_count < SINGLE_FRAME_ELEMENT_LIMIT || self.element_size == 1
    }

    /// Element length of each block except possibly the last. Meaningful
    /// only on the split path.
    pub fn leading_block_len(&self) -> usize {
        self.element_count.div_ceil(self.element_size)
    }

    /// Element length of the final block. May be zero, in which case no
    /// frame is emitted for it. Meaningful only on the split path.
    pub fn trailing_block_len(&self) -> usize {
        self.element_count - (self.element_size - 1) * self.leading_block_len()
    }

    /// The blocks of this plan, in transfer order.
    pub fn blocks(&self) -> Vec<Block> {
        if self.is_single_frame() {
            return vec![Block {
                offset: 0,
                len: self.element_count,
            }];
        }

        let leading = self.leading_block_len();
        let trailing = self.trailing_block_len();

        let mut blocks = Vec::with_capacity(self.element_size);
        for p in 0..self.element_size - 1 {
            blocks.push(Block {
                offset: p * leading,
                len: leading,
            });
        }
        if trailing > 0 {
            blocks.push(Block {
                offset: (self.element_size - 1) * leading,
                len: trailing,
            });
        }
        blocks
    }

    /// Number of frames this plan produces.
    pub fn frame_count(&self) -> usize {
        self.blocks().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn covers_exactly(plan: &ChunkPlan, element_count: usize) {
        let blocks = plan.blocks();
        let mut next = 0usize;
        for block in &blocks {
            assert_eq!(block.offset, next, "blocks must be contiguous");
            next += block.len;
        }
        assert_eq!(next, element_count, "blocks must cover the array");
    }

    #[test]
    fn small_arrays_are_one_frame() {
        for n in [1, 2, 513, 1023] {
            for s in [1, 2, 4, 8] {
                let plan = ChunkPlan::new(n, s);
                assert!(plan.is_single_frame());
                assert_eq!(plan.frame_count(), 1);
                covers_exactly(&plan, n);
            }
        }
    }

    #[test]
    fn single_byte_elements_are_one_frame_at_any_size() {
        let plan = ChunkPlan::new(5_000_000, 1);
        assert!(plan.is_single_frame());
        assert_eq!(plan.frame_count(), 1);
        assert_eq!(plan.blocks()[0].len, 5_000_000);
    }

    #[test]
    fn one_frame_boundary_for_wide_elements() {
        let below = ChunkPlan::new(1023, 8);
        assert_eq!(below.frame_count(), 1);

        let at = ChunkPlan::new(1024, 8);
        assert!(!at.is_single_frame());
        assert_eq!(at.frame_count(), 8);
        covers_exactly(&at, 1024);
    }

    #[test]
    fn reference_partition_arithmetic() {
        // 1025 doubles: 7 blocks of ceil(1025/8)=129, then 1025-7*129=122.
        let plan = ChunkPlan::new(1025, 8);
        assert_eq!(plan.leading_block_len(), 129);
        assert_eq!(plan.trailing_block_len(), 122);
        let blocks = plan.blocks();
        assert_eq!(blocks.len(), 8);
        assert!(blocks[..7].iter().all(|b| b.len == 129));
        assert_eq!(blocks[7].len, 122);
        covers_exactly(&plan, 1025);
    }

    #[test]
    fn exact_division_still_has_trailing_block() {
        // 1024 % 8 == 0: leading = 128, trailing = 1024 - 7*128 = 128.
        let plan = ChunkPlan::new(1024, 8);
        assert_eq!(plan.leading_block_len(), 128);
        assert_eq!(plan.trailing_block_len(), 128);
    }

    #[test]
    fn plan_is_deterministic() {
        for n in [1024, 1025, 4099, 10_000_000] {
            for s in [2, 4, 8] {
                let a = ChunkPlan::new(n, s).blocks();
                let b = ChunkPlan::new(n, s).blocks();
                assert_eq!(a, b);
                covers_exactly(&ChunkPlan::new(n, s), n);
            }
        }
    }

    #[test]
    fn byte_ranges_follow_element_offsets() {
        let plan = ChunkPlan::new(2000, 2);
        let blocks = plan.blocks();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].byte_range(2), 0..2000);
        assert_eq!(blocks[1].byte_range(2), 2000..4000);
    }

    #[test]
    fn frames_stay_under_the_length_bound() {
        // The partition keeps each frame's byte size near the element
        // count, far below the 32-bit frame bound even for wide elements.
        let n = 50_000_000;
        for s in [2, 4, 8] {
            let plan = ChunkPlan::new(n, s);
            for block in plan.blocks() {
                assert!(block.len * s <= (n / s + 1) * s);
                assert!(block.len * s < u32::MAX as usize);
            }
        }
    }
}
