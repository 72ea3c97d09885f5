//! Structural validation of schematics.
//!
//! Decoding checks the wire format; this module checks the in-memory
//! invariants every [`Schematic`](crate::model::Schematic) must hold no
//! matter where it came from.

use rustc_hash::FxHashSet;

use crate::error::ValidationError;
use crate::model::{BlockEntry, Size};

/// Validates that entries fit `size` and never share a position.
///
/// - every entry lies within `[0, size)` on each axis
/// - no two entries share a relative position
/// - a schematic with entries has every size component >= 1
pub fn validate_entries(entries: &[BlockEntry], size: Size) -> Result<(), ValidationError> {
    if entries.is_empty() {
        return Ok(());
    }
    if size.width == 0 || size.height == 0 || size.length == 0 {
        return Err(ValidationError::EmptySize);
    }

    let mut seen = FxHashSet::with_capacity_and_hasher(entries.len(), Default::default());
    for entry in entries {
        let pos = entry.pos;
        if !size.contains(pos) {
            return Err(ValidationError::EntryOutOfBounds {
                pos,
                width: size.width,
                height: size.height,
                length: size.length,
            });
        }
        if !seen.insert(pos) {
            return Err(ValidationError::DuplicateEntry { pos });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockPos, BlockTypeId};

    fn entry(x: i32, y: i32, z: i32) -> BlockEntry {
        BlockEntry::new(BlockPos::new(x, y, z), BlockTypeId::new("stone"))
    }

    #[test]
    fn test_accepts_in_bounds() {
        let size = Size::new(2, 2, 2);
        assert!(validate_entries(&[entry(0, 0, 0), entry(1, 1, 1)], size).is_ok());
    }

    #[test]
    fn test_rejects_out_of_bounds() {
        let size = Size::new(2, 2, 2);
        assert!(matches!(
            validate_entries(&[entry(2, 0, 0)], size),
            Err(ValidationError::EntryOutOfBounds { .. })
        ));
        assert!(matches!(
            validate_entries(&[entry(0, -1, 0)], size),
            Err(ValidationError::EntryOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_rejects_duplicates() {
        let size = Size::new(2, 2, 2);
        assert_eq!(
            validate_entries(&[entry(1, 0, 1), entry(1, 0, 1)], size),
            Err(ValidationError::DuplicateEntry {
                pos: BlockPos::new(1, 0, 1)
            })
        );
    }

    #[test]
    fn test_rejects_zero_size_with_entries() {
        assert_eq!(
            validate_entries(&[entry(0, 0, 0)], Size::new(0, 1, 1)),
            Err(ValidationError::EmptySize)
        );
        assert!(validate_entries(&[], Size::new(0, 0, 0)).is_ok());
    }
}
