//! Schematic encoding/decoding.
//!
//! Raw layout (little-endian unless varint):
//!
//! ```text
//! version        u32
//! width/height/length  u16 each
//! flags          u8   (bit 0: offset, bit 1: block entities, bit 2: data version)
//! [offset        3x i32]
//! [data_version  u32]
//! palette        varint count, count x string descriptor
//! block_data     varint byte length, then per palette id: varint count, count x varint packed
//! [entities      varint count, count x (varint packed, bytes metadata)]
//! ```
//!
//! The compressed envelope is `BLPZ`, a varint uncompressed length and a zstd frame.

use std::io::Read;

use rustc_hash::{FxHashMap, FxHashSet};
use sha2::{Digest, Sha256};

use crate::codec::primitives::{Reader, Writer};
use crate::error::{DecodeError, EncodeError};
use crate::limits::{
    FORMAT_VERSION, MAGIC_COMPRESSED, MAX_DESCRIPTOR_LEN, MAX_DIMENSION, MAX_METADATA_LEN,
    MAX_PACKED_POSITION, MAX_PALETTE_SIZE, MAX_SCHEMATIC_SIZE, MIN_FORMAT_VERSION,
};
use crate::model::{BlockEntry, BlockPos, BlockTypeId, Palette, Schematic, Size};

const FLAG_OFFSET: u8 = 0b01;
const FLAG_BLOCK_ENTITIES: u8 = 0b10;
const FLAG_DATA_VERSION: u8 = 0b100;
const FLAGS_KNOWN: u8 = FLAG_OFFSET | FLAG_BLOCK_ENTITIES | FLAG_DATA_VERSION;

/// Range of host data versions a reader accepts.
///
/// The format version covers this codec; the data version covers the
/// block names and states inside, which only the host can interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataVersionGate {
    /// The host's own data version; anything newer is rejected.
    pub current: u32,
    /// Oldest data version still read.
    pub minimum: u32,
}

impl DataVersionGate {
    pub fn new(current: u32, minimum: u32) -> Self {
        Self { current, minimum }
    }

    /// Checks a decoded schematic. Unstamped schematics always pass.
    pub fn check(&self, schematic: &Schematic) -> Result<(), DecodeError> {
        let Some(version) = schematic.data_version() else {
            return Ok(());
        };
        if version > self.current {
            return Err(DecodeError::FutureDataVersion {
                version,
                current: self.current,
            });
        }
        if version < self.minimum {
            return Err(DecodeError::StaleDataVersion {
                version,
                minimum: self.minimum,
            });
        }
        Ok(())
    }
}

// =============================================================================
// DECODING
// =============================================================================

/// Decompresses a `BLPZ` envelope, returning the raw schematic bytes.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>, DecodeError> {
    if input.len() < MAGIC_COMPRESSED.len() {
        return Err(DecodeError::UnexpectedEof { context: "magic" });
    }
    if &input[0..4] != MAGIC_COMPRESSED {
        let mut found = [0u8; 4];
        found.copy_from_slice(&input[0..4]);
        return Err(DecodeError::InvalidMagic { found });
    }
    decompress_zstd(&input[4..])
}

/// Returns true if `input` starts with the compressed envelope magic.
pub fn is_compressed(input: &[u8]) -> bool {
    input.len() >= MAGIC_COMPRESSED.len() && &input[0..4] == MAGIC_COMPRESSED
}

/// Decodes a schematic, accepting both raw and compressed input.
///
/// Either the whole schematic is returned or an error is; nothing is
/// partially decoded.
pub fn decode_schematic(input: &[u8]) -> Result<Schematic, DecodeError> {
    if is_compressed(input) {
        let raw = decompress_zstd(&input[4..])?;
        decode_raw(&raw)
    } else {
        decode_raw(input)
    }
}

/// Decodes a schematic and rejects data versions outside `gate`.
pub fn decode_schematic_gated(
    input: &[u8],
    gate: &DataVersionGate,
) -> Result<Schematic, DecodeError> {
    let schematic = decode_schematic(input)?;
    gate.check(&schematic)?;
    Ok(schematic)
}

fn decode_raw(input: &[u8]) -> Result<Schematic, DecodeError> {
    if input.len() > MAX_SCHEMATIC_SIZE {
        return Err(DecodeError::LengthExceedsLimit {
            field: "schematic",
            len: input.len(),
            max: MAX_SCHEMATIC_SIZE,
        });
    }

    let mut reader = Reader::new(input);

    // Version gate comes first: nothing after it is parsed for a future version
    let version = reader.read_u32("version")?;
    if version > FORMAT_VERSION {
        return Err(DecodeError::UnsupportedVersion {
            version,
            supported: FORMAT_VERSION,
        });
    }
    if version < MIN_FORMAT_VERSION {
        return Err(DecodeError::StaleVersion {
            version,
            minimum: MIN_FORMAT_VERSION,
        });
    }

    let width = reader.read_u16("width")?;
    let height = reader.read_u16("height")?;
    let length = reader.read_u16("length")?;
    if width == 0 || height == 0 || length == 0 {
        return Err(DecodeError::ZeroDimension {
            width,
            height,
            length,
        });
    }
    let size = Size::new(width as u32, height as u32, length as u32);
    let volume = size.volume();

    let flags = reader.read_byte("flags")?;
    if flags & !FLAGS_KNOWN != 0 {
        return Err(DecodeError::ReservedBitsSet { context: "flags" });
    }

    let offset = if flags & FLAG_OFFSET != 0 {
        let x = reader.read_i32("offset")?;
        let y = reader.read_i32("offset")?;
        let z = reader.read_i32("offset")?;
        BlockPos::new(x, y, z)
    } else {
        BlockPos::ORIGIN
    };
    let data_version = if flags & FLAG_DATA_VERSION != 0 {
        Some(reader.read_u32("data_version")?)
    } else {
        None
    };

    let palette = decode_palette(&mut reader)?;

    // Block data: one group per palette id, in id order
    let blob = reader.read_bytes_prefixed(MAX_SCHEMATIC_SIZE, "block_data")?;
    let mut data = Reader::new(blob);
    let mut entries: Vec<BlockEntry> = Vec::new();
    let mut index_by_packed: FxHashMap<u64, usize> = FxHashMap::default();

    let mut group = 0usize;
    while !data.is_empty() {
        let block = palette.try_get(group as u32).ok_or(DecodeError::IndexOutOfBounds {
            dict: "palette",
            index: group,
            size: palette.len(),
        })?;
        // Every packed position takes at least one byte
        let count = data.read_len(data.remaining_len(), "block_count")?;
        entries.reserve(count);
        for _ in 0..count {
            let packed = data.read_varint("packed_position")?;
            if packed >= volume {
                return Err(DecodeError::PositionOutOfBounds { packed, volume });
            }
            if index_by_packed.insert(packed, entries.len()).is_some() {
                return Err(DecodeError::DuplicatePosition {
                    packed,
                    context: "block_data",
                });
            }
            entries.push(BlockEntry::new(size.unpack(packed), block.clone()));
        }
        group += 1;
    }

    if flags & FLAG_BLOCK_ENTITIES != 0 {
        let count = reader.read_len(reader.remaining_len(), "block_entities")?;
        let mut seen = FxHashSet::with_capacity_and_hasher(count, Default::default());
        for _ in 0..count {
            let packed = reader.read_varint("block_entity_position")?;
            let &index = index_by_packed
                .get(&packed)
                .ok_or(DecodeError::OrphanMetadata { packed })?;
            if !seen.insert(packed) {
                return Err(DecodeError::DuplicatePosition {
                    packed,
                    context: "block_entities",
                });
            }
            let metadata = reader.read_bytes_prefixed(MAX_METADATA_LEN, "metadata")?;
            entries[index].metadata = Some(metadata.to_vec());
        }
    }

    if !reader.is_empty() {
        return Err(DecodeError::TrailingBytes {
            count: reader.remaining_len(),
            context: "schematic",
        });
    }

    let schematic = Schematic::from_parts(entries, size, offset);
    Ok(match data_version {
        Some(version) => schematic.with_data_version(version),
        None => schematic,
    })
}

fn decode_palette(reader: &mut Reader<'_>) -> Result<Palette, DecodeError> {
    let count = reader.read_len(MAX_PALETTE_SIZE, "palette")?;
    let mut blocks = Vec::with_capacity(count.min(reader.remaining_len()));
    for _ in 0..count {
        let descriptor = reader.read_str(MAX_DESCRIPTOR_LEN, "descriptor")?;
        let block: BlockTypeId =
            descriptor
                .parse()
                .map_err(|e: crate::model::ParseDescriptorError| {
                    DecodeError::InvalidDescriptor {
                        descriptor: descriptor.to_string(),
                        reason: e.to_string(),
                    }
                })?;
        blocks.push(block);
    }
    Palette::from_list(blocks).map_err(|dup| DecodeError::DuplicatePaletteEntry {
        descriptor: dup.to_string(),
    })
}

fn decompress_zstd(compressed: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut reader = Reader::new(compressed);
    let declared_size = reader.read_varint("uncompressed_size")? as usize;

    if declared_size > MAX_SCHEMATIC_SIZE {
        return Err(DecodeError::LengthExceedsLimit {
            field: "uncompressed_size",
            len: declared_size,
            max: MAX_SCHEMATIC_SIZE,
        });
    }

    let decoder = zstd::Decoder::new(reader.remaining())
        .map_err(|e| DecodeError::DecompressionFailed(e.to_string()))?;

    // Read one byte past the declared size so an oversized frame is caught
    // without inflating it completely.
    let mut decompressed = Vec::with_capacity(declared_size);
    decoder
        .take(declared_size as u64 + 1)
        .read_to_end(&mut decompressed)
        .map_err(|e| DecodeError::DecompressionFailed(e.to_string()))?;

    if decompressed.len() != declared_size {
        return Err(DecodeError::UncompressedSizeMismatch {
            declared: declared_size,
            actual: decompressed.len(),
        });
    }

    Ok(decompressed)
}

// =============================================================================
// ENCODING
// =============================================================================

/// Options for encoding schematics.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions {
    /// Enable canonical encoding mode.
    ///
    /// When enabled, entries are visited in packed-position order before the
    /// palette is built, so two schematics with the same content encode to
    /// the same bytes whatever order their entries were listed in.
    pub canonical: bool,
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn canonical() -> Self {
        Self { canonical: true }
    }
}

/// Encodes a schematic to the raw binary format.
///
/// The palette is assigned in entry order, so re-encoding a decoded
/// schematic reproduces the same bytes.
pub fn encode_schematic(schematic: &Schematic) -> Result<Vec<u8>, EncodeError> {
    encode_schematic_with_options(schematic, EncodeOptions::default())
}

/// Encodes a schematic with options.
pub fn encode_schematic_with_options(
    schematic: &Schematic,
    options: EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
    let size = schematic.size();
    let (width, height, length) = checked_dimensions(size)?;

    let volume = size.volume();
    if volume > MAX_PACKED_POSITION + 1 {
        return Err(EncodeError::VolumeTooLarge { volume });
    }

    let mut entries: Vec<&BlockEntry> = schematic.entries().iter().collect();
    if options.canonical {
        entries.sort_by_key(|e| size.pack(e.pos));
    }

    // Palette in first-seen order, positions grouped per palette id
    let mut palette = Palette::new();
    let mut groups: Vec<Vec<u64>> = Vec::new();
    for entry in &entries {
        let id = palette.get_or_insert(&entry.block) as usize;
        if id == groups.len() {
            groups.push(Vec::new());
        }
        groups[id].push(size.pack(entry.pos));
    }
    if palette.len() > MAX_PALETTE_SIZE {
        return Err(EncodeError::LengthExceedsLimit {
            field: "palette",
            len: palette.len(),
            max: MAX_PALETTE_SIZE,
        });
    }

    let mut data = Writer::with_capacity(entries.len() * 3 + groups.len());
    for positions in &groups {
        data.write_varint(positions.len() as u64);
        for &packed in positions {
            data.write_varint(packed);
        }
    }

    let mut block_entities: Vec<(u64, &[u8])> = entries
        .iter()
        .filter_map(|e| e.metadata.as_deref().map(|m| (size.pack(e.pos), m)))
        .collect();
    block_entities.sort_unstable_by_key(|&(packed, _)| packed);

    let offset = schematic.offset();
    let mut flags = 0u8;
    if !offset.is_zero() {
        flags |= FLAG_OFFSET;
    }
    if !block_entities.is_empty() {
        flags |= FLAG_BLOCK_ENTITIES;
    }
    if schematic.data_version().is_some() {
        flags |= FLAG_DATA_VERSION;
    }

    let mut writer = Writer::with_capacity(32 + palette.len() * 24 + data.len());
    writer.write_u32(FORMAT_VERSION);
    writer.write_u16(width);
    writer.write_u16(height);
    writer.write_u16(length);
    writer.write_byte(flags);
    if flags & FLAG_OFFSET != 0 {
        writer.write_i32(offset.x);
        writer.write_i32(offset.y);
        writer.write_i32(offset.z);
    }
    if let Some(version) = schematic.data_version() {
        writer.write_u32(version);
    }

    writer.write_varint(palette.len() as u64);
    for block in palette.as_slice() {
        let descriptor = block.to_string();
        // Separators or blanks inside a property would change the parse
        match descriptor.parse::<BlockTypeId>() {
            Ok(parsed) if parsed == *block => {}
            _ => return Err(EncodeError::UnrepresentableDescriptor { descriptor }),
        }
        if descriptor.len() > MAX_DESCRIPTOR_LEN {
            return Err(EncodeError::LengthExceedsLimit {
                field: "descriptor",
                len: descriptor.len(),
                max: MAX_DESCRIPTOR_LEN,
            });
        }
        writer.write_string(&descriptor);
    }

    writer.write_bytes_prefixed(data.as_bytes());

    if !block_entities.is_empty() {
        writer.write_varint(block_entities.len() as u64);
        for (packed, metadata) in block_entities {
            if metadata.len() > MAX_METADATA_LEN {
                return Err(EncodeError::LengthExceedsLimit {
                    field: "metadata",
                    len: metadata.len(),
                    max: MAX_METADATA_LEN,
                });
            }
            writer.write_varint(packed);
            writer.write_bytes_prefixed(metadata);
        }
    }

    if writer.len() > MAX_SCHEMATIC_SIZE {
        return Err(EncodeError::LengthExceedsLimit {
            field: "schematic",
            len: writer.len(),
            max: MAX_SCHEMATIC_SIZE,
        });
    }

    Ok(writer.into_bytes())
}

fn checked_dimensions(size: Size) -> Result<(u16, u16, u16), EncodeError> {
    let check = |axis: &'static str, value: u32| {
        if value == 0 || value > MAX_DIMENSION {
            Err(EncodeError::DimensionOutOfRange { axis, value })
        } else {
            Ok(value as u16)
        }
    };
    Ok((
        check("width", size.width)?,
        check("height", size.height)?,
        check("length", size.length)?,
    ))
}

/// Encodes a schematic with zstd compression.
pub fn encode_schematic_compressed(schematic: &Schematic, level: i32) -> Result<Vec<u8>, EncodeError> {
    let uncompressed = encode_schematic(schematic)?;

    let compressed = zstd::encode_all(uncompressed.as_slice(), level)
        .map_err(|e| EncodeError::CompressionFailed(e.to_string()))?;

    let mut writer = Writer::with_capacity(4 + 5 + compressed.len());
    writer.write_bytes(MAGIC_COMPRESSED);
    writer.write_varint(uncompressed.len() as u64);
    writer.write_bytes(&compressed);

    Ok(writer.into_bytes())
}

/// Content digest: the first 16 bytes of SHA-256 over the canonical encoding.
///
/// Schematics with the same size, offset and entry set share a digest
/// regardless of entry order.
pub fn schematic_digest(schematic: &Schematic) -> Result<[u8; 16], EncodeError> {
    let canonical = encode_schematic_with_options(schematic, EncodeOptions::canonical())?;
    let hash = Sha256::digest(&canonical);
    let mut digest = [0u8; 16];
    digest.copy_from_slice(&hash[..16]);
    Ok(digest)
}

/// Formats a digest as lowercase hex.
pub fn digest_hex(digest: &[u8; 16]) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
