//! Captured structures.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, WorldError};
use crate::model::{BlockPos, BlockTypeId, BoundingBox};
use crate::validate::validate_entries;
use crate::world::{BlockSet, WorldQuery};

/// Schematic dimensions along X (width), Y (height) and Z (length).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
    pub length: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32, length: u32) -> Self {
        Self {
            width,
            height,
            length,
        }
    }

    /// Whether a relative position lies within `[0, size)` on every axis.
    pub fn contains(&self, pos: BlockPos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && pos.z >= 0
            && (pos.x as u32) < self.width
            && (pos.y as u32) < self.height
            && (pos.z as u32) < self.length
    }

    pub fn volume(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.length as u64
    }

    /// Packs a relative position as `x + z*width + y*width*length`.
    ///
    /// The caller guarantees `pos` is inside the size.
    pub fn pack(&self, pos: BlockPos) -> u64 {
        let (w, l) = (self.width as u64, self.length as u64);
        pos.x as u64 + pos.z as u64 * w + pos.y as u64 * w * l
    }

    /// Inverse of [`Size::pack`]. The caller guarantees `packed < volume`.
    pub fn unpack(&self, packed: u64) -> BlockPos {
        let (w, l) = (self.width as u64, self.length as u64);
        let layer = w * l;
        let base = packed % layer;
        BlockPos::new((base % w) as i32, (packed / layer) as i32, (base / w) as i32)
    }
}

impl From<(u32, u32, u32)> for Size {
    fn from((width, height, length): (u32, u32, u32)) -> Self {
        Self::new(width, height, length)
    }
}

/// One block of a schematic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockEntry {
    /// Offset from the schematic's minimum corner.
    pub pos: BlockPos,
    pub block: BlockTypeId,
    /// Opaque auxiliary state (inventory contents, text, ...).
    pub metadata: Option<Vec<u8>>,
}

impl BlockEntry {
    pub fn new(pos: BlockPos, block: BlockTypeId) -> Self {
        Self {
            pos,
            block,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Vec<u8>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn has_metadata(&self) -> bool {
        self.metadata.as_ref().is_some_and(|m| !m.is_empty())
    }
}

/// An immutable captured structure.
///
/// Entries hold distinct positions inside `size`. `offset` is the vector
/// from the anchor (the table that captured it) to the minimum corner.
/// `data_version`, when set, is the host's world data version at capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schematic {
    entries: Vec<BlockEntry>,
    size: Size,
    offset: BlockPos,
    data_version: Option<u32>,
}

impl Schematic {
    /// Creates a schematic, checking the entry invariants.
    pub fn new(
        entries: Vec<BlockEntry>,
        size: Size,
        offset: BlockPos,
    ) -> Result<Self, ValidationError> {
        validate_entries(&entries, size)?;
        Ok(Self {
            entries,
            size,
            offset,
            data_version: None,
        })
    }

    /// Assembles a schematic whose invariants the caller has already checked.
    pub(crate) fn from_parts(entries: Vec<BlockEntry>, size: Size, offset: BlockPos) -> Self {
        Self {
            entries,
            size,
            offset,
            data_version: None,
        }
    }

    /// Stamps the host data version the blocks were captured under.
    pub fn with_data_version(mut self, data_version: u32) -> Self {
        self.data_version = Some(data_version);
        self
    }

    /// Captures every block inside `bbox` from the world.
    ///
    /// The anchor cell and any block in `ignore` are skipped. Positions are
    /// stored relative to `bbox.min`; the offset is `bbox.min - anchor`.
    pub fn capture<W>(
        world: &W,
        bbox: &BoundingBox,
        anchor: BlockPos,
        ignore: &BlockSet,
    ) -> Result<Self, WorldError>
    where
        W: WorldQuery + ?Sized,
    {
        let mut entries = Vec::new();

        for pos in bbox.iter() {
            if pos == anchor {
                continue;
            }
            let block = world.block_at(pos)?;
            if block.is_air() || ignore.contains(&block) {
                continue;
            }
            let mut entry = BlockEntry::new(pos - bbox.min, block);
            entry.metadata = world.metadata_at(pos)?.filter(|m| !m.is_empty());
            entries.push(entry);
        }

        if entries.is_empty() {
            tracing::warn!("Captured an empty blueprint from {}", bbox);
        } else {
            tracing::debug!("Captured {} blocks from {}", entries.len(), bbox);
        }

        let (width, height, length) = bbox.size();
        Ok(Self {
            entries,
            size: Size::new(width, height, length),
            offset: bbox.min - anchor,
            data_version: None,
        })
    }

    pub fn entries(&self) -> &[BlockEntry] {
        &self.entries
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn offset(&self) -> BlockPos {
        self.offset
    }

    pub fn data_version(&self) -> Option<u32> {
        self.data_version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up the entry at a relative position.
    pub fn entry_at(&self, pos: BlockPos) -> Option<&BlockEntry> {
        self.entries.iter().find(|e| e.pos == pos)
    }

    /// Count of entries per block name, ignoring variant properties.
    pub fn block_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.block.name().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Whether two schematics hold the same blocks, ignoring entry order.
    pub fn same_content(&self, other: &Schematic) -> bool {
        if self.size != other.size
            || self.offset != other.offset
            || self.data_version != other.data_version
            || self.len() != other.len()
        {
            return false;
        }
        let mut a: Vec<_> = self.entries.iter().collect();
        let mut b: Vec<_> = other.entries.iter().collect();
        a.sort_by_key(|e| e.pos);
        b.sort_by_key(|e| e.pos);
        a == b
    }
}

impl<'a> IntoIterator for &'a Schematic {
    type Item = &'a BlockEntry;
    type IntoIter = std::slice::Iter<'a, BlockEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::MemoryWorld;

    #[test]
    fn test_pack_unpack() {
        let size = Size::new(3, 4, 5);
        let pos = BlockPos::new(2, 3, 4);
        let packed = size.pack(pos);
        assert_eq!(packed, 2 + 4 * 3 + 3 * 3 * 5);
        assert_eq!(size.unpack(packed), pos);
    }

    #[test]
    fn test_new_validates() {
        let entry = BlockEntry::new(BlockPos::new(5, 0, 0), BlockTypeId::new("stone"));
        assert!(Schematic::new(vec![entry], Size::new(2, 2, 2), BlockPos::ORIGIN).is_err());
    }

    #[test]
    fn test_capture_skips_anchor_and_ignored() {
        let mut world = MemoryWorld::new();
        let anchor = BlockPos::new(0, 0, 0);
        world.put(anchor, BlockTypeId::new("blueprint_table"));
        world.put(BlockPos::new(1, 0, 0), BlockTypeId::new("scaffolding"));
        world.put(BlockPos::new(1, 1, 1), BlockTypeId::new("stone"));
        world.put(BlockPos::new(0, 1, 1), BlockTypeId::new("chest"));
        world.put_metadata(BlockPos::new(0, 1, 1), b"items".to_vec());
        world.put(BlockPos::new(1, 1, 0), BlockTypeId::new("structure_void"));

        let bbox = BoundingBox::from_corners(BlockPos::new(0, 0, 0), BlockPos::new(1, 1, 1));
        let ignore = BlockSet::from_names(["structure_void"]);
        let schematic = Schematic::capture(&world, &bbox, anchor, &ignore).unwrap();

        assert_eq!(schematic.size(), Size::new(2, 2, 2));
        assert_eq!(schematic.offset(), BlockPos::ORIGIN);
        assert_eq!(schematic.len(), 3);
        let chest = schematic.entry_at(BlockPos::new(0, 1, 1)).unwrap();
        assert_eq!(chest.metadata.as_deref(), Some(&b"items"[..]));
        assert!(schematic.entry_at(BlockPos::ORIGIN).is_none());
    }

    #[test]
    fn test_capture_offset_is_relative_to_anchor() {
        let mut world = MemoryWorld::new();
        world.put(BlockPos::new(-2, 0, -2), BlockTypeId::new("stone"));
        let bbox = BoundingBox::from_corners(BlockPos::new(-2, 0, -2), BlockPos::new(2, 3, 2));
        let schematic =
            Schematic::capture(&world, &bbox, BlockPos::new(0, 0, 0), &BlockSet::new()).unwrap();
        assert_eq!(schematic.offset(), BlockPos::new(-2, 0, -2));
        assert_eq!(schematic.entries()[0].pos, BlockPos::ORIGIN);
    }

    #[test]
    fn test_capture_propagates_world_errors() {
        let mut world = MemoryWorld::new();
        world.fail_at(BlockPos::new(1, 0, 0));
        let bbox = BoundingBox::from_corners(BlockPos::new(0, 0, 0), BlockPos::new(1, 0, 0));
        assert!(
            Schematic::capture(&world, &bbox, BlockPos::new(5, 5, 5), &BlockSet::new()).is_err()
        );
    }

    #[test]
    fn test_block_counts_ignore_properties() {
        let entries = vec![
            BlockEntry::new(BlockPos::new(0, 0, 0), BlockTypeId::new("oak_log").with_property("axis", "x")),
            BlockEntry::new(BlockPos::new(1, 0, 0), BlockTypeId::new("oak_log").with_property("axis", "y")),
            BlockEntry::new(BlockPos::new(0, 1, 0), BlockTypeId::new("stone")),
        ];
        let schematic = Schematic::new(entries, Size::new(2, 2, 1), BlockPos::ORIGIN).unwrap();
        let counts = schematic.block_counts();
        assert_eq!(counts["minecraft:oak_log"], 2);
        assert_eq!(counts["minecraft:stone"], 1);
    }
}
