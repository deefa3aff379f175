//! Save section holding a whole [`SparseChunkWorld`].
//!
//! Layout: `i32 chunk_size`, `i32 default_tile`, `i32 chunk_count`, followed by
//! `chunk_count` chunks in the chunk codec format, ordered by chunk coordinate.

use std::collections::HashSet;
use std::io::{Read, Write};

use tilegrid_core::wire::{read_i32, write_i32};
use tilegrid_core::{
    decode_chunk, encode_chunk, Chunk, ChunkCoord, ChunkSize, SparseChunkWorld, TileId,
};

use crate::container::SaveContainer;
use crate::error::{Result, SaveError};
use crate::section::{load_section, load_section_into, save_section, SaveSection};

/// Marker type for the world section
pub struct WorldSection;

/// Scalars stored ahead of the chunk list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldSectionHeader {
    pub chunk_size: i32,
    pub default_tile: TileId,
    pub chunk_count: i32,
}

impl WorldSectionHeader {
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let chunk_size = read_i32(reader)?;
        let default_tile = read_i32(reader)?;
        let chunk_count = read_i32(reader)?;
        if chunk_count < 0 {
            return Err(SaveError::Corrupt(format!(
                "negative chunk count {}",
                chunk_count
            )));
        }
        Ok(Self {
            chunk_size,
            default_tile,
            chunk_count,
        })
    }
}

/// Validated world section contents, ready to be applied
#[derive(Debug, Clone)]
pub struct DecodedWorld {
    pub header: WorldSectionHeader,
    chunk_size: ChunkSize,
    chunks: Vec<(ChunkCoord, Chunk)>,
}

impl DecodedWorld {
    fn add_chunks_to(self, world: &mut SparseChunkWorld) -> Result<()> {
        for (coord, chunk) in self.chunks {
            world.add_chunk_for_load(coord, chunk)?;
        }
        Ok(())
    }
}

impl SaveSection for WorldSection {
    const KEY: &'static str = "tilegrid.world";
    const VERSION: u32 = 1;

    type State = SparseChunkWorld;
    type Decoded = DecodedWorld;

    fn write_section<W: Write>(world: &SparseChunkWorld, writer: &mut W) -> Result<()> {
        let default_tile = world.default_tile();
        let mut chunks: Vec<_> = world.chunks().collect();
        chunks.sort_by_key(|(coord, _)| *coord);

        let chunk_count = i32::try_from(chunks.len())
            .map_err(|_| SaveError::Corrupt(format!("too many chunks: {}", chunks.len())))?;

        write_i32(writer, world.chunk_size().as_i32())?;
        write_i32(writer, default_tile)?;
        write_i32(writer, chunk_count)?;
        for (coord, chunk) in chunks {
            encode_chunk(writer, coord, chunk, default_tile)?;
        }
        Ok(())
    }

    fn read_section<R: Read>(reader: &mut R) -> Result<DecodedWorld> {
        let header = WorldSectionHeader::read(reader)?;
        let chunk_size = ChunkSize::new(header.chunk_size).map_err(|_| {
            SaveError::Corrupt(format!("invalid chunk size {}", header.chunk_size))
        })?;

        let mut seen: HashSet<ChunkCoord> = HashSet::new();
        let mut chunks = Vec::new();
        for _ in 0..header.chunk_count {
            let (coord, chunk) = decode_chunk(reader, chunk_size, header.default_tile)?;
            if !seen.insert(coord) {
                return Err(SaveError::Corrupt(format!("chunk {} stored twice", coord)));
            }
            chunks.push((coord, chunk));
        }

        Ok(DecodedWorld {
            header,
            chunk_size,
            chunks,
        })
    }

    fn build(decoded: DecodedWorld) -> Result<SparseChunkWorld> {
        let mut world =
            SparseChunkWorld::with_size(decoded.chunk_size, decoded.header.default_tile);
        decoded.add_chunks_to(&mut world)?;
        tracing::debug!(
            chunk_size = world.chunk_size().as_i32(),
            default_tile = world.default_tile(),
            chunks = world.chunk_count(),
            "world loaded"
        );
        Ok(world)
    }

    fn apply(decoded: DecodedWorld, world: &mut SparseChunkWorld) -> Result<()> {
        let header = decoded.header;
        if !world.is_compatible(header.chunk_size, header.default_tile) {
            tracing::info!(
                live_chunk_size = world.chunk_size().as_i32(),
                live_default_tile = world.default_tile(),
                saved_chunk_size = header.chunk_size,
                saved_default_tile = header.default_tile,
                "saved world is incompatible with the live one, building a fresh world"
            );
            *world = Self::build(decoded)?;
            return Ok(());
        }

        // Every chunk was decoded at this world's size and checked to be
        // addressable, so adding cannot fail once the world is cleared
        world.clear_all_chunks_for_load();
        decoded.add_chunks_to(world)?;
        tracing::debug!(chunks = world.chunk_count(), "world reloaded in place");
        Ok(())
    }
}

/// Store `world` in `container` under [`WorldSection::KEY`]
pub fn save_world<C: SaveContainer + ?Sized>(
    container: &mut C,
    world: &SparseChunkWorld,
) -> Result<()> {
    save_section::<WorldSection, C>(container, world)
}

/// Load the world section into a new world
pub fn load_world<C: SaveContainer + ?Sized>(container: &C) -> Result<SparseChunkWorld> {
    load_section::<WorldSection, C>(container)
}

/// Load the world section over a live world.
///
/// The live world is reused when its chunk size and default tile match the
/// saved ones and replaced by a fresh world otherwise. If the section is
/// missing, has another version or fails to decode, `world` is left as it was.
pub fn load_world_into<C: SaveContainer + ?Sized>(
    container: &C,
    world: &mut SparseChunkWorld,
) -> Result<()> {
    load_section_into::<WorldSection, C>(container, world)
}
