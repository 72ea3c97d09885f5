//! Narrow interfaces onto the host's world.
//!
//! The core never owns world state. Hosts implement [`WorldQuery`] (and
//! [`WorldMutation`] where blocks are placed) over their own block storage;
//! [`MemoryWorld`] is a sparse in-memory implementation.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::WorldError;
use crate::model::{BlockPos, BlockTypeId, BoundingBox};

/// Read access to blocks in the world.
pub trait WorldQuery {
    /// The block at `pos`. Unloaded or empty cells report air.
    fn block_at(&self, pos: BlockPos) -> Result<BlockTypeId, WorldError>;

    /// Serialized auxiliary state (inventory, text, ...) stored at `pos`.
    fn metadata_at(&self, _pos: BlockPos) -> Result<Option<Vec<u8>>, WorldError> {
        Ok(None)
    }

    /// Whether the block at `pos` belongs to `frame`.
    fn is_block_of_frame_type(&self, pos: BlockPos, frame: &BlockSet) -> Result<bool, WorldError> {
        Ok(frame.contains(&self.block_at(pos)?))
    }
}

/// Write access to blocks in the world.
pub trait WorldMutation {
    fn set_block(&mut self, pos: BlockPos, block: BlockTypeId) -> Result<(), WorldError>;
}

/// The viewers currently subscribed to a display.
pub trait ViewerSet {
    type Viewer: Clone;

    fn viewers(&self) -> Vec<Self::Viewer>;

    fn is_empty(&self) -> bool {
        self.viewers().is_empty()
    }
}

impl<T: Clone> ViewerSet for Vec<T> {
    type Viewer = T;

    fn viewers(&self) -> Vec<T> {
        self.clone()
    }

    fn is_empty(&self) -> bool {
        Vec::is_empty(self)
    }
}

/// A set of block types matched by name, ignoring variant properties.
///
/// Used for "frame" blocks (scaffolding) and for blocks a capture skips.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockSet {
    names: FxHashSet<String>,
}

impl BlockSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from block names; unqualified names get the default namespace.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| BlockTypeId::new(n.as_ref()).name().to_string())
                .collect(),
        }
    }

    pub fn contains(&self, block: &BlockTypeId) -> bool {
        self.names.contains(block.name())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Sparse in-memory world. Unset cells are air.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorld {
    blocks: FxHashMap<BlockPos, BlockTypeId>,
    metadata: FxHashMap<BlockPos, Vec<u8>>,
    failing: FxHashSet<BlockPos>,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `block`; placing air clears the cell and its metadata.
    pub fn put(&mut self, pos: BlockPos, block: BlockTypeId) {
        if block.is_air() {
            self.blocks.remove(&pos);
            self.metadata.remove(&pos);
        } else {
            self.blocks.insert(pos, block);
        }
    }

    pub fn put_metadata(&mut self, pos: BlockPos, data: Vec<u8>) {
        self.metadata.insert(pos, data);
    }

    /// Fills every cell of `bbox` with `block`.
    pub fn fill(&mut self, bbox: &BoundingBox, block: &BlockTypeId) {
        for pos in bbox.iter() {
            self.put(pos, block.clone());
        }
    }

    /// Makes every query at `pos` fail, simulating a host-side error.
    pub fn fail_at(&mut self, pos: BlockPos) {
        self.failing.insert(pos);
    }

    /// Number of non-air cells.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    fn check(&self, pos: BlockPos) -> Result<(), WorldError> {
        if self.failing.contains(&pos) {
            return Err(WorldError::new(pos, "chunk unavailable"));
        }
        Ok(())
    }
}

impl WorldQuery for MemoryWorld {
    fn block_at(&self, pos: BlockPos) -> Result<BlockTypeId, WorldError> {
        self.check(pos)?;
        Ok(self
            .blocks
            .get(&pos)
            .cloned()
            .unwrap_or_else(BlockTypeId::air))
    }

    fn metadata_at(&self, pos: BlockPos) -> Result<Option<Vec<u8>>, WorldError> {
        self.check(pos)?;
        Ok(self.metadata.get(&pos).cloned())
    }
}

impl WorldMutation for MemoryWorld {
    fn set_block(&mut self, pos: BlockPos, block: BlockTypeId) -> Result<(), WorldError> {
        self.check(pos)?;
        self.put(pos, block);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_cells_are_air() {
        let world = MemoryWorld::new();
        assert!(world.block_at(BlockPos::new(4, 5, 6)).unwrap().is_air());
    }

    #[test]
    fn test_frame_match_ignores_properties() {
        let mut world = MemoryWorld::new();
        let pos = BlockPos::new(1, 0, 0);
        world.put(pos, BlockTypeId::new("scaffolding").with_property("distance", "3"));

        let frame = BlockSet::from_names(["scaffolding"]);
        assert!(world.is_block_of_frame_type(pos, &frame).unwrap());
        assert!(!world.is_block_of_frame_type(BlockPos::ORIGIN, &frame).unwrap());
    }

    #[test]
    fn test_placing_air_clears_metadata() {
        let mut world = MemoryWorld::new();
        let pos = BlockPos::new(0, 1, 0);
        world.put(pos, BlockTypeId::new("chest"));
        world.put_metadata(pos, vec![1, 2, 3]);
        world.set_block(pos, BlockTypeId::air()).unwrap();
        assert!(world.metadata_at(pos).unwrap().is_none());
        assert!(world.is_empty());
    }

    #[test]
    fn test_failing_cell_reports_error() {
        let mut world = MemoryWorld::new();
        let pos = BlockPos::new(9, 9, 9);
        world.fail_at(pos);
        let err = world.block_at(pos).unwrap_err();
        assert_eq!(err.pos, pos);
    }
}
