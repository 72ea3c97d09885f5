//! Blueprints: outline detection and a compact paletted schematic format for
//! block worlds.
//!
//! A player marks a region with a scaffolding frame and a table; this crate
//! finds the frame, captures the blocks inside it, stores them under a
//! unique id and projects them back onto the world as a build guide.
//!
//! # Quick Start
//!
//! ```rust
//! use blueprint::{BlockPos, SchematicBuilder};
//! use blueprint::codec::{decode_schematic, encode_schematic};
//!
//! let schematic = SchematicBuilder::new((2, 1, 1))
//!     .offset(BlockPos::new(-1, 0, 0))
//!     .block((0, 0, 0), "stone")
//!     .block((1, 0, 0), "oak_stairs[facing=east]")
//!     .build()
//!     .unwrap();
//!
//! // Encode to binary
//! let bytes = encode_schematic(&schematic).unwrap();
//!
//! // Decode back
//! let decoded = decode_schematic(&bytes).unwrap();
//! assert!(decoded.same_content(&schematic));
//! ```
//!
//! # Modules
//!
//! - [`model`]: Positions, block descriptors, bounding boxes and schematics
//! - [`codec`]: Binary encoding/decoding with compression support
//! - [`outline`]: Scaffolding frame detection
//! - [`store`]: Unique ids, persistence and lookup
//! - [`projector`]: Per-tick comparison of a schematic with the live world
//! - [`registry`]: Table interaction over config, block sets and store
//! - [`world`]: Host world interfaces and an in-memory world
//! - [`error`]: Error types
//! - [`limits`]: Format constants and decoding limits
//!
//! # Security
//!
//! Stored schematics are untrusted input:
//! - All allocations are bounded by limits
//! - Varints are limited to five bytes
//! - Ids cannot escape their namespace directory
//!
//! # Wire Format
//!
//! - Raw: version + dimensions + flags + palette + block data
//! - Compressed: `BLPZ` magic + uncompressed size + zstd data
//!
//! The decoder automatically detects and handles both formats.

pub mod codec;
pub mod config;
pub mod error;
pub mod limits;
pub mod materials;
pub mod model;
pub mod outline;
pub mod projector;
pub mod registry;
pub mod store;
pub mod validate;
pub mod world;

// Re-export commonly used types at crate root
pub use codec::{decode_schematic, encode_schematic, encode_schematic_compressed, schematic_digest};
pub use config::BlueprintConfig;
pub use error::{
    ConfigError, DecodeError, EncodeError, ErrorKind, StoreError, TableError, ValidationError,
    WorldError,
};
pub use materials::{material_list, Material};
pub use model::{
    BlockEntry, BlockPos, BlockTypeId, BoundingBox, Direction, Rotation, Schematic,
    SchematicBuilder, SchematicId, Size,
};
pub use outline::detect_outline;
pub use projector::{DisplayState, Indicator, Projector, TickUpdate};
pub use registry::ModuleRegistry;
pub use store::{DirectoryBackend, MemoryBackend, SchematicBackend, SchematicStore};
pub use world::{BlockSet, MemoryWorld, ViewerSet, WorldMutation, WorldQuery};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
