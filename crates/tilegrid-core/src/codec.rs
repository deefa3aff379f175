//! Versioned binary encoding of a single chunk.
//!
//! Only cells that differ from the caller's default tile are written. All
//! integers are little-endian.
//!
//! ```text
//! i32  format version
//! i32  chunk x
//! i32  chunk y
//! u8   flags (bit 0: base tiles present, bit 1: per-entry extra blob)
//! i32  entry count
//! per entry:
//!   u16  local index (y * size + x)
//!   i32  tile id
//!   [i32 length, bytes]   only when bit 1 is set
//! ```
//!
//! Readers skip extra blobs through their length prefix and ignore unknown
//! flag bits, so newer writers stay readable.

use std::io::{self, Read, Write};

use crate::chunk::{Chunk, TileId};
use crate::coords::{ChunkCoord, ChunkSize, LocalCoord};
use crate::error::{GridError, Result};
use crate::wire::{read_i32, read_u16, read_u8, write_i32};

/// Format version written by [`encode_chunk`]
pub const CHUNK_FORMAT_VERSION: i32 = 1;

/// Flag bit: the entry list carries base tile ids
pub const FLAG_HAS_BASE_TILES: u8 = 0b01;

/// Flag bit: every entry is followed by a length-prefixed extra blob
pub const FLAG_HAS_TILE_EXTRA: u8 = 0b10;

/// Header fields of an encoded chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub version: i32,
    pub coord: ChunkCoord,
    pub flags: u8,
    pub entry_count: i32,
}

/// Write the non-default cells of `chunk`
pub fn encode_chunk<W: Write>(
    writer: &mut W,
    coord: ChunkCoord,
    chunk: &Chunk,
    default_tile: TileId,
) -> Result<()> {
    let size = chunk.size();
    if !coord.is_addressable(size) {
        return Err(GridError::InvalidArgument(format!(
            "chunk {} holds no addressable cell at size {}",
            coord, size
        )));
    }
    let count = chunk.count_differing_from(default_tile);
    // Bounded by the chunk area, at most 65536
    let entry_count = count as i32;

    write_i32(writer, CHUNK_FORMAT_VERSION)?;
    write_i32(writer, coord.x)?;
    write_i32(writer, coord.y)?;
    writer.write_all(&[FLAG_HAS_BASE_TILES])?;
    write_i32(writer, entry_count)?;

    for (local, id) in chunk.cells_differing_from(default_tile) {
        writer.write_all(&local.index(size).to_le_bytes())?;
        write_i32(writer, id)?;
    }

    Ok(())
}

/// Encode a chunk into a fresh buffer
pub fn encode_chunk_to_vec(
    coord: ChunkCoord,
    chunk: &Chunk,
    default_tile: TileId,
) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(17 + chunk.count_differing_from(default_tile) * 6);
    encode_chunk(&mut buf, coord, chunk, default_tile)?;
    Ok(buf)
}

/// Read and validate the fixed header of an encoded chunk
pub fn decode_header<R: Read>(reader: &mut R) -> Result<ChunkHeader> {
    let version = read_i32(reader)?;
    if version != CHUNK_FORMAT_VERSION {
        return Err(GridError::UnsupportedVersion {
            found: version,
            expected: CHUNK_FORMAT_VERSION,
        });
    }
    let x = read_i32(reader)?;
    let y = read_i32(reader)?;
    let flags = read_u8(reader)?;
    let entry_count = read_i32(reader)?;
    if entry_count < 0 {
        return Err(GridError::Corrupt(format!(
            "negative entry count {} for chunk [{}, {}]",
            entry_count, x, y
        )));
    }

    Ok(ChunkHeader {
        version,
        coord: ChunkCoord::new(x, y),
        flags,
        entry_count,
    })
}

/// Rebuild a chunk of `size` filled with `default_tile`, then replay entries
pub fn decode_chunk<R: Read>(
    reader: &mut R,
    size: ChunkSize,
    default_tile: TileId,
) -> Result<(ChunkCoord, Chunk)> {
    let header = decode_header(reader)?;
    if !header.coord.is_addressable(size) {
        return Err(GridError::Corrupt(format!(
            "chunk {} lies outside the addressable world at size {}",
            header.coord, size
        )));
    }
    if header.flags & FLAG_HAS_TILE_EXTRA != 0 {
        tracing::trace!(coord = %header.coord, "skipping per-entry extra blobs");
    }
    let mut chunk = Chunk::new(size, default_tile);

    for _ in 0..header.entry_count {
        let index = read_u16(reader)?;
        let id = read_i32(reader)?;
        if header.flags & FLAG_HAS_TILE_EXTRA != 0 {
            skip_extra(reader)?;
        }
        let local = LocalCoord::from_index(index, size)?;
        chunk.set_local(local, id)?;
    }

    Ok((header.coord, chunk))
}

/// Decode a chunk from a byte slice
pub fn decode_chunk_from_slice(
    mut bytes: &[u8],
    size: ChunkSize,
    default_tile: TileId,
) -> Result<(ChunkCoord, Chunk)> {
    decode_chunk(&mut bytes, size, default_tile)
}

fn skip_extra<R: Read>(reader: &mut R) -> Result<()> {
    let len = read_i32(reader)?;
    if len < 0 {
        return Err(GridError::Corrupt(format!("negative extra length {}", len)));
    }
    let skipped = io::copy(&mut reader.by_ref().take(len as u64), &mut io::sink())?;
    if skipped != len as u64 {
        return Err(GridError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "extra blob truncated",
        )));
    }
    Ok(())
}
