//! Sparse chunk-keyed tile world.
//!
//! Only chunks holding at least one non-default cell live in the map. Any
//! chunk coordinate absent from the map reads as `default_tile` in every cell,
//! and `get_tile` is the one place that rule is applied.

use std::collections::{HashMap, HashSet};

use crate::chunk::{Chunk, TileId};
use crate::coords::{world_to_chunk, world_to_local, CellCoord, ChunkCoord, ChunkSize};
use crate::error::{GridError, Result};

/// Logically infinite 2D grid of tile ids backed by a map of chunks.
///
/// Mutation requires `&mut self`; there is no internal locking. The world is
/// meant to be owned by a single update loop.
#[derive(Debug, Clone)]
pub struct SparseChunkWorld {
    chunk_size: ChunkSize,
    default_tile: TileId,
    chunks: HashMap<ChunkCoord, Chunk>,
    /// Chunks changed since a consumer last cleared them
    dirty_render: HashSet<ChunkCoord>,
}

impl SparseChunkWorld {
    /// Create an empty world. Fails if `chunk_size` is outside `1..=256`.
    pub fn new(chunk_size: i32, default_tile: TileId) -> Result<Self> {
        Ok(Self::with_size(ChunkSize::new(chunk_size)?, default_tile))
    }

    pub fn with_size(chunk_size: ChunkSize, default_tile: TileId) -> Self {
        Self {
            chunk_size,
            default_tile,
            chunks: HashMap::new(),
            dirty_render: HashSet::new(),
        }
    }

    pub fn chunk_size(&self) -> ChunkSize {
        self.chunk_size
    }

    pub fn default_tile(&self) -> TileId {
        self.default_tile
    }

    /// Check whether saved data with these parameters can load into this world
    pub fn is_compatible(&self, chunk_size: i32, default_tile: TileId) -> bool {
        self.chunk_size.as_i32() == chunk_size && self.default_tile == default_tile
    }

    /// Get the tile id at world cell `(x, y)`.
    ///
    /// Cells in chunks that are not stored read as the default tile.
    ///
    /// # Examples
    ///
    /// ```
    /// use tilegrid_core::SparseChunkWorld;
    ///
    /// let mut world = SparseChunkWorld::new(8, 0).unwrap();
    /// world.set_tile(-1, -1, 4).unwrap();
    /// assert_eq!(world.get_tile(-1, -1), 4);
    /// assert_eq!(world.get_tile(-9, -9), 0);
    /// ```
    pub fn get_tile(&self, x: i32, y: i32) -> TileId {
        let cell = CellCoord::new(x, y);
        let coord = world_to_chunk(cell, self.chunk_size);
        match self.chunks.get(&coord) {
            Some(chunk) => {
                let local = world_to_local(cell, self.chunk_size);
                // local is in range by construction
                chunk.get_local(local).unwrap_or(self.default_tile)
            }
            None => self.default_tile,
        }
    }

    /// Set the tile id at world cell `(x, y)` and mark its chunk dirty.
    ///
    /// Writing the default into an absent chunk creates nothing. A write that
    /// leaves a chunk uniformly default removes the chunk from the map.
    ///
    /// # Arguments
    ///
    /// * `x` - World column, any `i32`
    /// * `y` - World row, any `i32`
    /// * `id` - Tile id to store
    pub fn set_tile(&mut self, x: i32, y: i32, id: TileId) -> Result<()> {
        let cell = CellCoord::new(x, y);
        let coord = world_to_chunk(cell, self.chunk_size);
        let local = world_to_local(cell, self.chunk_size);

        if id == self.default_tile && !self.chunks.contains_key(&coord) {
            return Ok(());
        }

        let chunk_size = self.chunk_size;
        let default_tile = self.default_tile;
        let chunk = self
            .chunks
            .entry(coord)
            .or_insert_with(|| Chunk::new(chunk_size, default_tile));
        chunk.set_local(local, id)?;

        if chunk.is_uniform_of(default_tile) {
            tracing::trace!(%coord, "chunk back to default, evicting");
            self.chunks.remove(&coord);
        }

        self.dirty_render.insert(coord);
        Ok(())
    }

    /// Get a chunk by coordinate, if present
    pub fn try_get_chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    /// Evict a chunk, restoring every cell in it to the default tile
    pub fn remove_chunk(&mut self, coord: ChunkCoord) -> Option<Chunk> {
        let removed = self.chunks.remove(&coord);
        if removed.is_some() {
            self.dirty_render.insert(coord);
        }
        removed
    }

    /// Number of chunks holding non-default content
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Iterate present chunks. Order carries no meaning.
    pub fn chunks(&self) -> impl Iterator<Item = (ChunkCoord, &Chunk)> {
        self.chunks.iter().map(|(coord, chunk)| (*coord, chunk))
    }

    /// Chunk coordinates changed since they were last cleared.
    ///
    /// Consumers redraw each coordinate and then call
    /// [`clear_dirty_render`](Self::clear_dirty_render) for it.
    ///
    /// # Examples
    ///
    /// ```
    /// use tilegrid_core::{ChunkCoord, SparseChunkWorld};
    ///
    /// let mut world = SparseChunkWorld::new(16, 0).unwrap();
    /// world.set_tile(1, 1, 9).unwrap();
    /// let dirty: Vec<_> = world.dirty_render_chunks().collect();
    /// assert_eq!(dirty, vec![ChunkCoord::new(0, 0)]);
    ///
    /// world.clear_dirty_render(ChunkCoord::new(0, 0));
    /// assert_eq!(world.dirty_render_chunks().count(), 0);
    /// ```
    pub fn dirty_render_chunks(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.dirty_render.iter().copied()
    }

    pub fn is_dirty_render(&self, coord: ChunkCoord) -> bool {
        self.dirty_render.contains(&coord)
    }

    /// Acknowledge a dirty chunk. Returns true if it was marked.
    pub fn clear_dirty_render(&mut self, coord: ChunkCoord) -> bool {
        self.dirty_render.remove(&coord)
    }

    /// Drain every dirty chunk coordinate at once
    pub fn take_dirty_render(&mut self) -> Vec<ChunkCoord> {
        self.dirty_render.drain().collect()
    }

    /// Drop all chunks and dirty marks ahead of a load
    pub fn clear_all_chunks_for_load(&mut self) {
        tracing::debug!(chunks = self.chunks.len(), "clearing world for load");
        self.chunks.clear();
        self.dirty_render.clear();
    }

    /// Insert a decoded chunk and mark it dirty once.
    ///
    /// The chunk is rebased onto the world's default tile so that writing the
    /// default back into every cell evicts it. Chunks that hold nothing but
    /// the default tile are not stored.
    ///
    /// # Arguments
    ///
    /// * `coord` - Chunk coordinate; must contain at least one addressable cell
    /// * `chunk` - Chunk of the world's size
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the size differs or the coordinate is unreachable.
    pub fn add_chunk_for_load(&mut self, coord: ChunkCoord, mut chunk: Chunk) -> Result<()> {
        if !coord.is_addressable(self.chunk_size) {
            return Err(GridError::InvalidArgument(format!(
                "chunk {} holds no addressable cell at size {}",
                coord, self.chunk_size
            )));
        }
        if chunk.size() != self.chunk_size {
            return Err(GridError::InvalidArgument(format!(
                "chunk {} has size {}, world uses {}",
                coord,
                chunk.size(),
                self.chunk_size
            )));
        }
        if chunk.base() != self.default_tile {
            chunk.rebase(self.default_tile);
        }
        if chunk.count_differing_from(self.default_tile) > 0 {
            self.chunks.insert(coord, chunk);
        }
        self.dirty_render.insert(coord);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::StorageKind;

    #[test]
    fn test_unset_cells_read_default() {
        let world = SparseChunkWorld::new(16, 42).unwrap();
        for &(x, y) in &[(0, 0), (-1, -1), (1000, -1000), (i32::MIN, i32::MAX)] {
            assert_eq!(world.get_tile(x, y), 42);
        }
        assert_eq!(world.chunk_count(), 0);
    }

    #[test]
    fn test_invalid_chunk_size() {
        assert!(matches!(
            SparseChunkWorld::new(0, 0),
            Err(GridError::InvalidArgument(_))
        ));
        assert!(SparseChunkWorld::new(-16, 0).is_err());
        assert!(SparseChunkWorld::new(512, 0).is_err());
    }

    #[test]
    fn test_set_and_get() {
        let mut world = SparseChunkWorld::new(16, 0).unwrap();
        world.set_tile(5, 5, 3).unwrap();
        world.set_tile(20, 20, 7).unwrap();

        assert_eq!(world.get_tile(5, 5), 3);
        assert_eq!(world.get_tile(20, 20), 7);
        assert_eq!(world.get_tile(0, 0), 0);
        assert_eq!(world.chunk_count(), 2);
    }

    #[test]
    fn test_negative_coordinates() {
        let mut world = SparseChunkWorld::new(8, 0).unwrap();
        world.set_tile(-1, -1, 4).unwrap();

        let chunk = world.try_get_chunk(ChunkCoord::new(-1, -1)).unwrap();
        assert_eq!(chunk.get(7, 7).unwrap(), 4);
        assert_eq!(world.get_tile(-1, -1), 4);
        assert_eq!(world.get_tile(-9, -9), 0);
        assert!(world.try_get_chunk(ChunkCoord::new(-2, -2)).is_none());
    }

    #[test]
    fn test_default_write_creates_nothing() {
        let mut world = SparseChunkWorld::new(16, 2).unwrap();
        world.set_tile(3, 3, 2).unwrap();
        assert_eq!(world.chunk_count(), 0);
        assert_eq!(world.dirty_render_chunks().count(), 0);
    }

    #[test]
    fn test_default_write_evicts_chunk() {
        let mut world = SparseChunkWorld::new(16, 0).unwrap();
        world.set_tile(1, 1, 9).unwrap();
        world.set_tile(2, 1, 9).unwrap();
        assert_eq!(world.chunk_count(), 1);

        world.set_tile(1, 1, 0).unwrap();
        assert_eq!(world.chunk_count(), 1);
        world.take_dirty_render();

        world.set_tile(2, 1, 0).unwrap();
        assert_eq!(world.chunk_count(), 0);
        assert!(world.try_get_chunk(ChunkCoord::new(0, 0)).is_none());
        assert_eq!(world.get_tile(2, 1), 0);
        // Eviction is still a visible change
        assert!(world.is_dirty_render(ChunkCoord::new(0, 0)));
    }

    #[test]
    fn test_dirty_tracking() {
        let mut world = SparseChunkWorld::new(16, 0).unwrap();
        world.set_tile(1, 1, 9).unwrap();
        assert!(world.is_dirty_render(ChunkCoord::new(0, 0)));

        assert!(world.clear_dirty_render(ChunkCoord::new(0, 0)));
        assert!(!world.is_dirty_render(ChunkCoord::new(0, 0)));

        // Writes to another chunk leave it clean
        world.set_tile(100, 100, 9).unwrap();
        assert!(!world.is_dirty_render(ChunkCoord::new(0, 0)));

        world.set_tile(2, 2, 1).unwrap();
        assert!(world.is_dirty_render(ChunkCoord::new(0, 0)));
    }

    #[test]
    fn test_take_dirty_render_drains() {
        let mut world = SparseChunkWorld::new(4, 0).unwrap();
        world.set_tile(0, 0, 1).unwrap();
        world.set_tile(-1, 0, 1).unwrap();
        world.set_tile(1, 1, 1).unwrap();

        let mut dirty = world.take_dirty_render();
        dirty.sort();
        assert_eq!(dirty, vec![ChunkCoord::new(-1, 0), ChunkCoord::new(0, 0)]);
        assert_eq!(world.dirty_render_chunks().count(), 0);
    }

    #[test]
    fn test_remove_chunk() {
        let mut world = SparseChunkWorld::new(8, 0).unwrap();
        world.set_tile(10, 10, 5).unwrap();
        world.take_dirty_render();

        let removed = world.remove_chunk(ChunkCoord::new(1, 1)).unwrap();
        assert_eq!(removed.get(2, 2).unwrap(), 5);
        assert_eq!(world.get_tile(10, 10), 0);
        assert!(world.is_dirty_render(ChunkCoord::new(1, 1)));
        assert!(world.remove_chunk(ChunkCoord::new(1, 1)).is_none());
    }

    #[test]
    fn test_chunks_enumerates_present() {
        let mut world = SparseChunkWorld::new(16, 0).unwrap();
        world.set_tile(0, 0, 1).unwrap();
        world.set_tile(-1, 0, 1).unwrap();
        world.set_tile(0, 16, 1).unwrap();

        let mut coords: Vec<_> = world.chunks().map(|(coord, _)| coord).collect();
        coords.sort();
        assert_eq!(
            coords,
            vec![
                ChunkCoord::new(-1, 0),
                ChunkCoord::new(0, 0),
                ChunkCoord::new(0, 1),
            ]
        );
    }

    #[test]
    fn test_load_support() {
        let mut world = SparseChunkWorld::new(8, 0).unwrap();
        world.set_tile(1, 1, 1).unwrap();

        world.clear_all_chunks_for_load();
        assert_eq!(world.chunk_count(), 0);
        assert_eq!(world.dirty_render_chunks().count(), 0);

        let size = ChunkSize::new(8).unwrap();
        let mut chunk = Chunk::new(size, 0);
        chunk.set(3, 4, 6).unwrap();
        world.add_chunk_for_load(ChunkCoord::new(2, -1), chunk).unwrap();

        assert_eq!(world.get_tile(19, -4), 6);
        assert_eq!(world.chunk_count(), 1);
        assert_eq!(world.take_dirty_render(), vec![ChunkCoord::new(2, -1)]);

        let wrong = Chunk::new(ChunkSize::new(16).unwrap(), 0);
        assert!(world.add_chunk_for_load(ChunkCoord::new(0, 0), wrong).is_err());

        // All-default chunks are not kept
        world.add_chunk_for_load(ChunkCoord::new(5, 5), Chunk::new(size, 0)).unwrap();
        assert!(world.try_get_chunk(ChunkCoord::new(5, 5)).is_none());
    }

    #[test]
    fn test_loaded_chunk_with_other_base_still_evicts() {
        let mut world = SparseChunkWorld::new(2, 0).unwrap();
        let size = world.chunk_size();
        world
            .add_chunk_for_load(ChunkCoord::new(0, 0), Chunk::new(size, 5))
            .unwrap();
        assert_eq!(world.chunk_count(), 1);
        assert_eq!(world.get_tile(1, 1), 5);

        for (x, y) in [(0, 0), (1, 0), (0, 1)] {
            world.set_tile(x, y, 0).unwrap();
        }
        assert_eq!(world.chunk_count(), 1);
        world.set_tile(1, 1, 0).unwrap();
        assert_eq!(world.chunk_count(), 0);
        assert!(world.try_get_chunk(ChunkCoord::new(0, 0)).is_none());
    }

    #[test]
    fn test_load_rejects_unreachable_chunk() {
        let mut world = SparseChunkWorld::new(16, 0).unwrap();
        let mut chunk = Chunk::new(world.chunk_size(), 0);
        chunk.set(0, 0, 1).unwrap();
        let err = world
            .add_chunk_for_load(ChunkCoord::new(i32::MAX, 0), chunk.clone())
            .unwrap_err();
        assert!(matches!(err, GridError::InvalidArgument(_)));
        assert_eq!(world.chunk_count(), 0);

        world
            .add_chunk_for_load(ChunkCoord::new(134_217_727, 0), chunk)
            .unwrap();
        assert_eq!(world.get_tile(i32::MAX - 15, 0), 1);
    }

    #[test]
    fn test_is_compatible() {
        let world = SparseChunkWorld::new(16, 0).unwrap();
        assert!(world.is_compatible(16, 0));
        assert!(!world.is_compatible(32, 0));
        assert!(!world.is_compatible(16, 1));
    }

    #[test]
    fn test_storage_promotes_inside_world() {
        let mut world = SparseChunkWorld::new(4, 0).unwrap();
        world.set_tile(0, 0, 3).unwrap();
        let chunk = world.try_get_chunk(ChunkCoord::new(0, 0)).unwrap();
        assert_eq!(chunk.storage_kind(), StorageKind::Dense);
    }
}
