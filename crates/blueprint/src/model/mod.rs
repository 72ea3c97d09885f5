//! Data model types for blueprints.
//!
//! This module contains the core types for representing captured structures:
//! - Positions, directions and rotations
//! - Block type descriptors and palettes
//! - Bounding boxes
//! - Schematics and their entries
//! - Schematic identifiers
//! - Builders (ergonomic construction)

pub mod block;
pub mod bounds;
pub mod builder;
pub mod id;
pub mod palette;
pub mod position;
pub mod schematic;

pub use block::{BlockTypeId, ParseDescriptorError, DEFAULT_NAMESPACE};
pub use bounds::BoundingBox;
pub use builder::SchematicBuilder;
pub use id::SchematicId;
pub use palette::Palette;
pub use position::{BlockPos, Direction, Rotation};
pub use schematic::{BlockEntry, Schematic, Size};
