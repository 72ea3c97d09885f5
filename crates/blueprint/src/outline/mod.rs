//! Outline detection.
//!
//! Finds the largest rectangle of frame blocks around a start position in
//! its horizontal plane, then the highest matching rectangle above it, and
//! returns the 3D box spanning both.
//!
//! "No structure" is `Ok(None)`; only a failing world query is an error.

use std::time::Instant;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::WorldError;
use crate::model::{BlockPos, BoundingBox, Direction};

/// Detects the frame outline around `origin`.
///
/// `is_frame` reports whether a position holds a frame block. The origin
/// itself always counts as frame, since the anchor usually sits on the
/// perimeter. Each position is queried at most once.
pub fn detect_outline<F>(
    origin: BlockPos,
    max_side_length: u32,
    is_frame: F,
) -> Result<Option<BoundingBox>, WorldError>
where
    F: FnMut(BlockPos) -> Result<bool, WorldError>,
{
    let started = Instant::now();
    let mut probe = FrameProbe::new(origin, is_frame);

    let Some(base) = find_base_square(&mut probe, origin, max_side_length)? else {
        tracing::debug!("No base square found around {}", origin);
        return Ok(None);
    };
    let Some(top) = find_top_square(&mut probe, &base, max_side_length)? else {
        tracing::debug!("Base square {} has no matching top square", base);
        return Ok(None);
    };

    let outline = base.encompass(&top);
    tracing::info!(
        "Detected outline {} in {:?} ({} positions queried)",
        outline,
        started.elapsed(),
        probe.queried()
    );
    Ok(Some(outline))
}

/// Memoizing wrapper around the frame predicate.
struct FrameProbe<F> {
    origin: BlockPos,
    is_frame: F,
    cache: FxHashMap<BlockPos, bool>,
}

impl<F> FrameProbe<F>
where
    F: FnMut(BlockPos) -> Result<bool, WorldError>,
{
    fn new(origin: BlockPos, is_frame: F) -> Self {
        Self {
            origin,
            is_frame,
            cache: FxHashMap::default(),
        }
    }

    fn check(&mut self, pos: BlockPos) -> Result<bool, WorldError> {
        if pos == self.origin {
            return Ok(true);
        }
        if let Some(&hit) = self.cache.get(&pos) {
            return Ok(hit);
        }
        let hit = (self.is_frame)(pos)?;
        self.cache.insert(pos, hit);
        Ok(hit)
    }

    fn queried(&self) -> usize {
        self.cache.len()
    }

    /// Frame positions up to `max_distance` steps away, farthest first.
    fn scan(
        &mut self,
        from: BlockPos,
        direction: Direction,
        max_distance: u32,
    ) -> Result<Vec<BlockPos>, WorldError> {
        let mut found = Vec::new();
        for i in 1..=max_distance as i32 {
            let pos = from.offset(direction, i);
            if self.check(pos)? {
                found.push(pos);
            }
        }
        // Scanned nearest first along a straight line
        found.reverse();
        Ok(found)
    }

    /// Whether every cell on the four edges of `bbox`'s bottom layer is frame.
    fn has_valid_perimeter(&mut self, bbox: &BoundingBox) -> Result<bool, WorldError> {
        for pos in bbox.perimeter() {
            if !self.check(pos)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn find_base_square<F>(
    probe: &mut FrameProbe<F>,
    origin: BlockPos,
    max_side_length: u32,
) -> Result<Option<BoundingBox>, WorldError>
where
    F: FnMut(BlockPos) -> Result<bool, WorldError>,
{
    let mut by_direction = Vec::with_capacity(4);
    for direction in Direction::HORIZONTAL {
        let found = probe.scan(origin, direction, max_side_length)?;
        if !found.is_empty() {
            by_direction.push(found);
        }
    }
    if by_direction.len() < 2 {
        return Ok(None);
    }

    let candidates = candidate_boxes(&by_direction, max_side_length);
    tracing::debug!(
        "Found {} possible base squares around {}",
        candidates.len(),
        origin
    );

    for bbox in candidates {
        if probe.has_valid_perimeter(&bbox)? {
            return Ok(Some(bbox));
        }
    }
    Ok(None)
}

/// Every rectangle spanned by one position per direction, deduplicated,
/// within the size limit, largest first.
///
/// The sort is stable, so equal areas keep the farthest-first order of the
/// direction lists.
fn candidate_boxes(by_direction: &[Vec<BlockPos>], max_side_length: u32) -> Vec<BoundingBox> {
    let mut seen = FxHashSet::default();
    let mut boxes = Vec::new();
    let mut choice = vec![0usize; by_direction.len()];

    loop {
        let picked = choice
            .iter()
            .zip(by_direction)
            .map(|(&i, positions)| positions[i]);
        if let Some(bbox) = BoundingBox::surrounding_flat(picked) {
            if fits(&bbox, max_side_length) && seen.insert(bbox) {
                boxes.push(bbox);
            }
        }

        // Odometer step over the cartesian product, last list fastest
        let mut slot = by_direction.len();
        loop {
            if slot == 0 {
                boxes.sort_by_key(|b| std::cmp::Reverse(b.volume()));
                return boxes;
            }
            slot -= 1;
            choice[slot] += 1;
            if choice[slot] < by_direction[slot].len() {
                break;
            }
            choice[slot] = 0;
        }
    }
}

fn fits(bbox: &BoundingBox, max_side_length: u32) -> bool {
    let (x, y, z) = bbox.size();
    x <= max_side_length && y <= max_side_length && z <= max_side_length
}

fn find_top_square<F>(
    probe: &mut FrameProbe<F>,
    base: &BoundingBox,
    max_side_length: u32,
) -> Result<Option<BoundingBox>, WorldError>
where
    F: FnMut(BlockPos) -> Result<bool, WorldError>,
{
    let scan_distance = max_side_length.saturating_mul(2);

    let up_min = probe.scan(base.min, Direction::Up, scan_distance)?;
    let up_max = probe.scan(base.max, Direction::Up, scan_distance)?;

    let max_levels: FxHashSet<i32> = up_max.iter().map(|p| p.y).collect();
    // Already highest first
    let common: Vec<i32> = up_min
        .iter()
        .map(|p| p.y)
        .filter(|y| max_levels.contains(y))
        .collect();

    for y in common {
        let top = BoundingBox::from_corners(base.min.with_y(y), base.max.with_y(y));
        if probe.has_valid_perimeter(&top)? {
            return Ok(Some(top));
        }
    }
    Ok(None)
}
