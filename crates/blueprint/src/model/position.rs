//! Block coordinates, directions and horizontal rotations.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Integer block coordinate. Used both for absolute world positions and for
/// offsets relative to a schematic corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const ORIGIN: BlockPos = BlockPos::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Moves `distance` steps in `direction`.
    pub fn offset(self, direction: Direction, distance: i32) -> Self {
        let (dx, dy, dz) = direction.vector();
        Self::new(
            self.x + dx * distance,
            self.y + dy * distance,
            self.z + dz * distance,
        )
    }

    pub fn with_y(self, y: i32) -> Self {
        Self::new(self.x, y, self.z)
    }

    /// Squared euclidean distance to `other`.
    pub fn distance_squared(self, other: BlockPos) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        let dz = (self.z - other.z) as i64;
        dx * dx + dy * dy + dz * dz
    }

    pub fn is_zero(self) -> bool {
        self == Self::ORIGIN
    }
}

impl Add for BlockPos {
    type Output = BlockPos;

    fn add(self, rhs: BlockPos) -> BlockPos {
        BlockPos::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for BlockPos {
    type Output = BlockPos;

    fn sub(self, rhs: BlockPos) -> BlockPos {
        BlockPos::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<(i32, i32, i32)> for BlockPos {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

/// Axis-aligned unit direction. North is -Z, east is +X.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl Direction {
    /// The four horizontal directions in clockwise order starting north.
    pub const HORIZONTAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub const fn vector(self) -> (i32, i32, i32) {
        match self {
            Direction::Down => (0, -1, 0),
            Direction::Up => (0, 1, 0),
            Direction::North => (0, 0, -1),
            Direction::South => (0, 0, 1),
            Direction::West => (-1, 0, 0),
            Direction::East => (1, 0, 0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Down => "down",
            Direction::Up => "up",
            Direction::North => "north",
            Direction::South => "south",
            Direction::West => "west",
            Direction::East => "east",
        }
    }

    pub fn from_name(name: &str) -> Option<Direction> {
        match name {
            "down" => Some(Direction::Down),
            "up" => Some(Direction::Up),
            "north" => Some(Direction::North),
            "south" => Some(Direction::South),
            "west" => Some(Direction::West),
            "east" => Some(Direction::East),
            _ => None,
        }
    }

    pub fn is_horizontal(self) -> bool {
        !matches!(self, Direction::Up | Direction::Down)
    }

    /// Index into [`Direction::HORIZONTAL`], or `None` for up/down.
    fn horizontal_index(self) -> Option<usize> {
        Direction::HORIZONTAL.iter().position(|d| *d == self)
    }
}

/// Quarter-turn rotation about the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    Counterclockwise90,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::None,
        Rotation::Clockwise90,
        Rotation::Clockwise180,
        Rotation::Counterclockwise90,
    ];

    /// Number of clockwise quarter turns (0..4).
    pub fn quarter_turns(self) -> usize {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 1,
            Rotation::Clockwise180 => 2,
            Rotation::Counterclockwise90 => 3,
        }
    }

    /// Facing north means no rotation; east, south and west turn clockwise
    /// by 90, 180 and 270 degrees. Vertical directions map to no rotation.
    pub fn from_facing(facing: Direction) -> Rotation {
        match facing {
            Direction::East => Rotation::Clockwise90,
            Direction::South => Rotation::Clockwise180,
            Direction::West => Rotation::Counterclockwise90,
            _ => Rotation::None,
        }
    }

    /// Inverse of [`Rotation::from_facing`].
    pub fn to_facing(self) -> Direction {
        Direction::HORIZONTAL[self.quarter_turns()]
    }

    /// Rotates a vector about the origin.
    pub fn rotate_pos(self, pos: BlockPos) -> BlockPos {
        let BlockPos { x, y, z } = pos;
        match self {
            Rotation::None => pos,
            Rotation::Clockwise90 => BlockPos::new(-z, y, x),
            Rotation::Clockwise180 => BlockPos::new(-x, y, -z),
            Rotation::Counterclockwise90 => BlockPos::new(z, y, -x),
        }
    }

    /// Rotates a direction. Vertical directions are unchanged.
    pub fn rotate_direction(self, direction: Direction) -> Direction {
        match direction.horizontal_index() {
            Some(i) => Direction::HORIZONTAL[(i + self.quarter_turns()) % 4],
            None => direction,
        }
    }
}
