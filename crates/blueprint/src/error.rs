//! Error types for schematic encoding/decoding, storage and detection.

use thiserror::Error;

use crate::model::{BlockPos, SchematicId};

/// Broad failure classes for a decode.
///
/// Every [`DecodeError`] belongs to exactly one kind. Callers that only need
/// to tell "corrupt" from "written by a newer build" match on this instead of
/// on the individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Structurally invalid data: truncated, missing fields, bad indices.
    Malformed,
    /// Written by a newer format version than this build understands.
    UnsupportedVersion,
    /// Written by a format version older than the minimum still supported.
    StaleVersion,
    /// A varint needed more than five bytes.
    CorruptVarint,
}

impl ErrorKind {
    /// Returns a short stable name for the kind (e.g. "malformed").
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Malformed => "malformed",
            ErrorKind::UnsupportedVersion => "unsupported_version",
            ErrorKind::StaleVersion => "stale_version",
            ErrorKind::CorruptVarint => "corrupt_varint",
        }
    }
}

/// Error during binary decoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    // === Version gate ===
    #[error("cannot read future schematic version {version} (newest supported is {supported})")]
    UnsupportedVersion { version: u32, supported: u32 },

    #[error("schematic version {version} is no longer supported (minimum is {minimum})")]
    StaleVersion { version: u32, minimum: u32 },

    #[error("cannot read future data version {version} (host is on {current})")]
    FutureDataVersion { version: u32, current: u32 },

    #[error("data version {version} is no longer supported (minimum is {minimum})")]
    StaleDataVersion { version: u32, minimum: u32 },

    // === Varints ===
    #[error("varint exceeds maximum length (5 bytes) while reading {context}")]
    VarintTooLong { context: &'static str },

    // === Malformed ===
    #[error("unexpected end of input while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error("invalid magic bytes: found {found:?}")]
    InvalidMagic { found: [u8; 4] },

    #[error("invalid schematic size {width}x{height}x{length}")]
    ZeroDimension { width: u16, height: u16, length: u16 },

    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("invalid UTF-8 in {field}")]
    InvalidUtf8 { field: &'static str },

    #[error("invalid block descriptor {descriptor:?}: {reason}")]
    InvalidDescriptor { descriptor: String, reason: String },

    #[error("palette declares {descriptor} twice")]
    DuplicatePaletteEntry { descriptor: String },

    #[error("{dict} index {index} out of bounds (size: {size})")]
    IndexOutOfBounds {
        dict: &'static str,
        index: usize,
        size: usize,
    },

    #[error("packed position {packed} outside schematic volume {volume}")]
    PositionOutOfBounds { packed: u64, volume: u64 },

    #[error("packed position {packed} appears more than once in {context}")]
    DuplicatePosition { packed: u64, context: &'static str },

    #[error("metadata for packed position {packed} has no matching block")]
    OrphanMetadata { packed: u64 },

    #[error("reserved bits are non-zero in {context}")]
    ReservedBitsSet { context: &'static str },

    #[error("{count} trailing bytes after {context}")]
    TrailingBytes { count: usize, context: &'static str },

    #[error("zstd decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("decompressed size {actual} doesn't match declared {declared}")]
    UncompressedSizeMismatch { declared: usize, actual: usize },
}

impl DecodeError {
    /// Returns the failure class for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::UnsupportedVersion { .. } | DecodeError::FutureDataVersion { .. } => {
                ErrorKind::UnsupportedVersion
            }
            DecodeError::StaleVersion { .. } | DecodeError::StaleDataVersion { .. } => {
                ErrorKind::StaleVersion
            }
            DecodeError::VarintTooLong { .. } => ErrorKind::CorruptVarint,
            _ => ErrorKind::Malformed,
        }
    }
}

/// Error during binary encoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("{axis} {value} out of range for unsigned short (1-65535)")]
    DimensionOutOfRange { axis: &'static str, value: u32 },

    #[error("schematic volume {volume} exceeds the packed position range")]
    VolumeTooLarge { volume: u64 },

    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("block descriptor {descriptor:?} would not read back as the same block")]
    UnrepresentableDescriptor { descriptor: String },

    #[error("zstd compression failed: {0}")]
    CompressionFailed(String),
}

/// Violation of a [`Schematic`](crate::model::Schematic) invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("entry at {pos} lies outside size {width}x{height}x{length}")]
    EntryOutOfBounds {
        pos: BlockPos,
        width: u32,
        height: u32,
        length: u32,
    },

    #[error("two entries share relative position {pos}")]
    DuplicateEntry { pos: BlockPos },

    #[error("schematic with entries must have every size component >= 1")]
    EmptySize,
}

/// Failure reported by a host world collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("world query failed at {pos}: {message}")]
pub struct WorldError {
    pub pos: BlockPos,
    pub message: String,
}

impl WorldError {
    pub fn new(pos: BlockPos, message: impl Into<String>) -> Self {
        Self {
            pos,
            message: message.into(),
        }
    }
}

/// Error from the schematic store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed for {id}: {source}")]
    Io {
        id: SchematicId,
        #[source]
        source: std::io::Error,
    },

    #[error("could not load schematics for namespace {namespace}: {source}")]
    LoadFailed {
        namespace: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not encode {id}: {source}")]
    Encode {
        id: SchematicId,
        #[source]
        source: EncodeError,
    },

    #[error("could not decode {id}: {source}")]
    Decode {
        id: SchematicId,
        #[source]
        source: DecodeError,
    },

    #[error("no free name left for base {base:?}")]
    NameCollisionExhausted { base: String },

    #[error("invalid schematic id {0:?}")]
    InvalidId(String),
}

/// Error loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Outcome of a failed table action.
///
/// `Display` carries the cause for logs; [`TableError::user_message`] is the
/// only part a player should see.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("no valid scaffolding outline around {pos}")]
    InvalidStructure { pos: BlockPos },

    #[error("world query failed: {0}")]
    World(#[from] WorldError),

    #[error("could not save blueprint: {0}")]
    SaveFailed(#[from] StoreError),
}

impl TableError {
    /// Translation key of the message shown to the player.
    pub fn user_message(&self) -> &'static str {
        match self {
            TableError::InvalidStructure { .. } => "invalid_structure",
            TableError::World(_) | TableError::SaveFailed(_) => "internal_error",
        }
    }
}
