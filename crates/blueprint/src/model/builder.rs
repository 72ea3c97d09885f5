//! Builder API for ergonomic schematic construction.
//!
//! # Example
//!
//! ```rust
//! use blueprint::model::builder::SchematicBuilder;
//! use blueprint::model::BlockPos;
//!
//! let schematic = SchematicBuilder::new((3, 2, 3))
//!     .offset(BlockPos::new(-1, 0, -1))
//!     .block((0, 0, 0), "stone")
//!     .block((2, 0, 2), "oak_stairs[facing=east]")
//!     .block_with_metadata((1, 1, 1), "chest", b"inventory".to_vec())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schematic.len(), 3);
//! ```

use crate::error::ValidationError;
use crate::model::{BlockEntry, BlockPos, BlockTypeId, Schematic, Size};

/// Builder for constructing a [`Schematic`] entry by entry.
#[derive(Debug, Clone)]
pub struct SchematicBuilder {
    size: Size,
    offset: BlockPos,
    entries: Vec<BlockEntry>,
}

impl SchematicBuilder {
    /// Creates a builder for a schematic of the given size.
    pub fn new(size: impl Into<Size>) -> Self {
        Self {
            size: size.into(),
            offset: BlockPos::ORIGIN,
            entries: Vec::new(),
        }
    }

    /// Sets the anchor-to-corner offset.
    pub fn offset(mut self, offset: BlockPos) -> Self {
        self.offset = offset;
        self
    }

    /// Adds a block from its descriptor string.
    ///
    /// # Panics
    ///
    /// Panics if `descriptor` does not parse; use [`SchematicBuilder::entry`]
    /// for descriptors that are not literals.
    pub fn block(self, pos: impl Into<BlockPos>, descriptor: &str) -> Self {
        let block = parse_literal(descriptor);
        self.entry(BlockEntry::new(pos.into(), block))
    }

    /// Adds a block carrying a metadata blob.
    ///
    /// # Panics
    ///
    /// Panics if `descriptor` does not parse.
    pub fn block_with_metadata(
        self,
        pos: impl Into<BlockPos>,
        descriptor: &str,
        metadata: Vec<u8>,
    ) -> Self {
        let block = parse_literal(descriptor);
        self.entry(BlockEntry::new(pos.into(), block).with_metadata(metadata))
    }

    /// Adds a prepared entry.
    pub fn entry(mut self, entry: BlockEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Adds the same block at every position.
    pub fn fill<I>(mut self, positions: I, block: &BlockTypeId) -> Self
    where
        I: IntoIterator<Item = BlockPos>,
    {
        self.entries
            .extend(positions.into_iter().map(|p| BlockEntry::new(p, block.clone())));
        self
    }

    /// Builds the schematic, checking its invariants.
    pub fn build(self) -> Result<Schematic, ValidationError> {
        Schematic::new(self.entries, self.size, self.offset)
    }
}

fn parse_literal(descriptor: &str) -> BlockTypeId {
    match descriptor.parse() {
        Ok(block) => block,
        Err(e) => panic!("invalid block descriptor {descriptor:?}: {e}"),
    }
}
