//! Format constants and decoder limits.
//!
//! The decoder bounds every allocation by these values so that untrusted
//! input cannot request unbounded memory.

/// Current schematic format version written by the encoder.
pub const FORMAT_VERSION: u32 = 1;

/// Oldest format version the decoder still accepts.
pub const MIN_FORMAT_VERSION: u32 = 1;

/// Magic prefix of the zstd-compressed envelope.
pub const MAGIC_COMPRESSED: &[u8; 4] = b"BLPZ";

/// Maximum encoded length of a single varint.
///
/// Five 7-bit groups cover the full 32-bit range with bits to spare; a
/// sixth continuation byte means the stream is corrupt.
pub const MAX_VARINT_BYTES: usize = 5;

/// Largest value of each schematic dimension (unsigned 16-bit).
pub const MAX_DIMENSION: u32 = u16::MAX as u32;

/// Largest packed position the format can express.
pub const MAX_PACKED_POSITION: u64 = u32::MAX as u64;

/// Maximum number of distinct block types in one palette.
pub const MAX_PALETTE_SIZE: usize = 1 << 16;

/// Maximum length of one block descriptor string.
pub const MAX_DESCRIPTOR_LEN: usize = 1024;

/// Maximum size of one metadata blob.
pub const MAX_METADATA_LEN: usize = 2 * 1024 * 1024;

/// Maximum size of a decompressed schematic.
pub const MAX_SCHEMATIC_SIZE: usize = 64 * 1024 * 1024;

/// Maximum length of a schematic name (file system limit).
pub const MAX_NAME_LEN: usize = 255;

/// Highest numeric suffix tried when disambiguating a name.
pub const MAX_NAME_SUFFIX: u32 = 1_000_000;
