//! Binary encoding/decoding for schematics.
//!
//! This module implements the paletted schematic format and its zstd
//! envelope.

pub mod primitives;
pub mod schematic;

pub use primitives::{Reader, Writer, to_varint_bytes};
pub use schematic::{
    decode_schematic, decode_schematic_gated, decompress, digest_hex, encode_schematic,
    encode_schematic_compressed, encode_schematic_with_options, is_compressed, schematic_digest,
    DataVersionGate, EncodeOptions,
};
