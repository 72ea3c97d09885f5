//! Hologram projection of a schematic onto the live world.
//!
//! Every tick recomputes each indicator from the current world state; the
//! projector keeps no memory of earlier ticks.

use crate::error::WorldError;
use crate::model::{BlockEntry, BlockPos, BlockTypeId, BoundingBox, Direction, Rotation, Schematic};
use crate::world::{ViewerSet, WorldQuery};

/// Glow colour of a block that still needs placing.
pub const NEEDED_COLOR: u32 = 0x0CA6E8;
/// Glow colour of a cell holding the right block in the wrong orientation or variant.
pub const VARIANT_MISMATCH_COLOR: u32 = 0xFF7B00;
/// Glow colour of a cell holding a different block.
pub const WRONG_COLOR: u32 = 0xD42020;

/// How one schematic entry compares with the live world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayState {
    /// The cell is empty: show the intended block as a guide.
    MatchingAir,
    /// The cell already holds the intended block: show nothing.
    ExactMatch,
    /// Same block, different properties (e.g. facing the wrong way).
    VariantMismatch,
    /// A different block occupies the cell.
    TypeMismatch,
}

impl DisplayState {
    /// Classifies a live cell against the intended block.
    pub fn classify(intended: &BlockTypeId, live: &BlockTypeId) -> DisplayState {
        if live.is_air() {
            DisplayState::MatchingAir
        } else if live == intended {
            DisplayState::ExactMatch
        } else if live.same_block(intended) {
            DisplayState::VariantMismatch
        } else {
            DisplayState::TypeMismatch
        }
    }

    /// Glow colour of the indicator, `None` when hidden.
    pub fn glow_color(self) -> Option<u32> {
        match self {
            DisplayState::MatchingAir => Some(NEEDED_COLOR),
            DisplayState::ExactMatch => None,
            DisplayState::VariantMismatch => Some(VARIANT_MISMATCH_COLOR),
            DisplayState::TypeMismatch => Some(WRONG_COLOR),
        }
    }

    pub fn is_visible(self) -> bool {
        self != DisplayState::ExactMatch
    }
}

/// Display decision for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indicator {
    pub world_pos: BlockPos,
    /// The intended block, rotated to the projector's facing.
    pub block: BlockTypeId,
    pub state: DisplayState,
}

/// Everything a host needs to refresh one tick of a projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickUpdate<V> {
    pub viewers: Vec<V>,
    pub indicators: Vec<Indicator>,
}

impl<V> TickUpdate<V> {
    /// Indicators that should be drawn.
    pub fn visible(&self) -> impl Iterator<Item = &Indicator> {
        self.indicators.iter().filter(|i| i.state.is_visible())
    }

    /// Number of entries not yet placed exactly.
    pub fn remaining(&self) -> usize {
        self.visible().count()
    }

    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }
}

/// A schematic placed in the world at an anchor with a facing.
#[derive(Debug, Clone)]
pub struct Projector {
    schematic: Schematic,
    anchor: BlockPos,
    rotation: Rotation,
}

impl Projector {
    /// Projects `schematic` from `anchor`; facing north leaves it unrotated.
    pub fn new(schematic: Schematic, anchor: BlockPos, facing: Direction) -> Self {
        Self {
            schematic,
            anchor,
            rotation: Rotation::from_facing(facing),
        }
    }

    pub fn schematic(&self) -> &Schematic {
        &self.schematic
    }

    pub fn anchor(&self) -> BlockPos {
        self.anchor
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn facing(&self) -> Direction {
        self.rotation.to_facing()
    }

    /// Turns the projection to face `facing`. Vertical directions reset it.
    pub fn set_facing(&mut self, facing: Direction) {
        self.rotation = Rotation::from_facing(facing);
    }

    /// World position of an entry: anchor + rotate(offset + relative position).
    pub fn world_pos(&self, entry: &BlockEntry) -> BlockPos {
        self.anchor + self.rotation.rotate_pos(self.schematic.offset() + entry.pos)
    }

    /// The schematic's box in world space under the current rotation.
    pub fn world_bounds(&self) -> BoundingBox {
        let size = self.schematic.size();
        let min = self.schematic.offset();
        let far = min
            + BlockPos::new(
                size.width.saturating_sub(1) as i32,
                size.height.saturating_sub(1) as i32,
                size.length.saturating_sub(1) as i32,
            );
        BoundingBox::from_corners(
            self.anchor + self.rotation.rotate_pos(min),
            self.anchor + self.rotation.rotate_pos(far),
        )
    }

    /// Classifies every entry against the live world.
    pub fn indicators<W>(&self, world: &W) -> Result<Vec<Indicator>, WorldError>
    where
        W: WorldQuery + ?Sized,
    {
        self.schematic
            .entries()
            .iter()
            .map(|entry| {
                let world_pos = self.world_pos(entry);
                let block = entry.block.rotated(self.rotation);
                let live = world.block_at(world_pos)?;
                let state = DisplayState::classify(&block, &live);
                Ok(Indicator {
                    world_pos,
                    block,
                    state,
                })
            })
            .collect()
    }

    /// Runs one tick. Returns `None` without touching the world when nobody
    /// is watching.
    pub fn tick<W, S>(&self, world: &W, viewers: &S) -> Result<Option<TickUpdate<S::Viewer>>, WorldError>
    where
        W: WorldQuery + ?Sized,
        S: ViewerSet + ?Sized,
    {
        let viewers = viewers.viewers();
        if viewers.is_empty() {
            return Ok(None);
        }
        let indicators = self.indicators(world)?;
        Ok(Some(TickUpdate {
            viewers,
            indicators,
        }))
    }
}
