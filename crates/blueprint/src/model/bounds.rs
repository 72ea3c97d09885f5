//! Inclusive axis-aligned boxes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::BlockPos;

/// Axis-aligned box with inclusive corners; `min <= max` on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: BlockPos,
    pub max: BlockPos,
}

impl BoundingBox {
    /// Smallest box containing both corners, in any order.
    pub fn from_corners(a: BlockPos, b: BlockPos) -> Self {
        Self {
            min: BlockPos::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: BlockPos::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Smallest horizontal rectangle containing every position, at the Y
    /// level of the first one. `None` when `positions` is empty.
    pub fn surrounding_flat<I>(positions: I) -> Option<Self>
    where
        I: IntoIterator<Item = BlockPos>,
    {
        let mut iter = positions.into_iter();
        let first = iter.next()?;
        let mut min = first;
        let mut max = first;
        for pos in iter {
            min.x = min.x.min(pos.x);
            min.z = min.z.min(pos.z);
            max.x = max.x.max(pos.x);
            max.z = max.z.max(pos.z);
        }
        Some(Self { min, max })
    }

    /// Smallest box containing both boxes.
    pub fn encompass(&self, other: &BoundingBox) -> BoundingBox {
        Self {
            min: BlockPos::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: BlockPos::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    /// Block counts along X, Y and Z.
    pub fn size(&self) -> (u32, u32, u32) {
        (
            (self.max.x - self.min.x) as u32 + 1,
            (self.max.y - self.min.y) as u32 + 1,
            (self.max.z - self.min.z) as u32 + 1,
        )
    }

    /// Number of cells in the box.
    pub fn volume(&self) -> u64 {
        let (x, y, z) = self.size();
        x as u64 * y as u64 * z as u64
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        (self.min.x..=self.max.x).contains(&pos.x)
            && (self.min.y..=self.max.y).contains(&pos.y)
            && (self.min.z..=self.max.z).contains(&pos.z)
    }

    /// Every cell, X fastest, then Z, then Y.
    pub fn iter(&self) -> impl Iterator<Item = BlockPos> + '_ {
        (self.min.y..=self.max.y).flat_map(move |y| {
            (self.min.z..=self.max.z)
                .flat_map(move |z| (self.min.x..=self.max.x).map(move |x| BlockPos::new(x, y, z)))
        })
    }

    /// The cells on the four edges of this box's bottom layer.
    pub fn perimeter(&self) -> impl Iterator<Item = BlockPos> + '_ {
        let y = self.min.y;
        let x_edges = (self.min.x..=self.max.x)
            .flat_map(move |x| [BlockPos::new(x, y, self.min.z), BlockPos::new(x, y, self.max.z)]);
        let z_edges = (self.min.z..=self.max.z)
            .flat_map(move |z| [BlockPos::new(self.min.x, y, z), BlockPos::new(self.max.x, y, z)]);
        x_edges.chain(z_edges)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.min, self.max)
    }
}
