//! Block palette: dense integer ids for the block types of one schematic.

use rustc_hash::FxHashMap;

use crate::model::BlockTypeId;

/// Bidirectional mapping between block types and dense ids.
///
/// Ids start at 0 and are assigned in first-seen order. Each schematic
/// builds its own palette; ids mean nothing outside that schematic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Palette {
    blocks: Vec<BlockTypeId>,
    indices: FxHashMap<BlockTypeId, u32>,
}

impl Palette {
    /// Creates an empty palette.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a palette from an explicit ordered list.
    ///
    /// Returns the first duplicated descriptor as the error, since a list
    /// naming one type twice cannot be inverted.
    pub fn from_list(blocks: Vec<BlockTypeId>) -> Result<Self, BlockTypeId> {
        let mut indices = FxHashMap::with_capacity_and_hasher(blocks.len(), Default::default());
        for (i, block) in blocks.iter().enumerate() {
            if indices.insert(block.clone(), i as u32).is_some() {
                return Err(block.clone());
            }
        }
        Ok(Self { blocks, indices })
    }

    /// Returns the id of `block`, assigning the next unused id if it is new.
    pub fn get_or_insert(&mut self, block: &BlockTypeId) -> u32 {
        if let Some(&id) = self.indices.get(block) {
            return id;
        }
        let id = self.blocks.len() as u32;
        self.blocks.push(block.clone());
        self.indices.insert(block.clone(), id);
        id
    }

    /// Looks up the id of `block` without inserting.
    pub fn id_of(&self, block: &BlockTypeId) -> Option<u32> {
        self.indices.get(block).copied()
    }

    /// Looks up a block by id, `None` when out of range.
    pub fn try_get(&self, id: u32) -> Option<&BlockTypeId> {
        self.blocks.get(id as usize)
    }

    /// Looks up a block by id for display, yielding air for unused ids.
    ///
    /// Never use this while parsing: an out-of-range id in a data stream is
    /// corruption, not air.
    pub fn get(&self, id: u32) -> BlockTypeId {
        self.try_get(id).cloned().unwrap_or_else(BlockTypeId::air)
    }

    /// The palette entries in id order.
    pub fn as_slice(&self) -> &[BlockTypeId] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_dense_first_seen() {
        let stone = BlockTypeId::new("stone");
        let dirt = BlockTypeId::new("dirt");
        let mut palette = Palette::new();

        assert_eq!(palette.get_or_insert(&stone), 0);
        assert_eq!(palette.get_or_insert(&dirt), 1);
        assert_eq!(palette.get_or_insert(&stone), 0);
        assert_eq!(palette.len(), 2);
        assert_eq!(palette.as_slice(), &[stone, dirt]);
    }

    #[test]
    fn test_out_of_range_reads_as_air() {
        let mut palette = Palette::new();
        palette.get_or_insert(&BlockTypeId::new("stone"));

        assert!(palette.try_get(5).is_none());
        assert!(palette.get(5).is_air());
        assert_eq!(palette.get(0), BlockTypeId::new("stone"));
    }

    #[test]
    fn test_from_list_rejects_duplicates() {
        let stone = BlockTypeId::new("stone");
        let result = Palette::from_list(vec![stone.clone(), BlockTypeId::new("dirt"), stone.clone()]);
        assert_eq!(result, Err(stone));
    }
}
