pub mod chunk;
pub mod codec;
pub mod coords;
pub mod error;
pub mod wire;
pub mod world;

pub use chunk::{Chunk, StorageKind, TileId};
pub use codec::{
    decode_chunk, decode_chunk_from_slice, encode_chunk, encode_chunk_to_vec, CHUNK_FORMAT_VERSION,
};
pub use coords::{
    chunk_origin, floor_div, floor_mod, local_to_world, world_to_chunk, world_to_local, CellCoord,
    ChunkCoord, ChunkSize, LocalCoord, MAX_CHUNK_SIZE,
};
pub use error::{GridError, Result};
pub use world::SparseChunkWorld;
