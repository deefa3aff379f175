//! Fixed-size square block of tile ids.
//!
//! A chunk starts out `Uniform`, holding a single scalar for all of its cells,
//! and is promoted to `Dense` (one id per cell) on the first write that breaks
//! homogeneity. Reads and writes are O(1) in both representations.
//!
//! Each chunk remembers the value it was created with (its *base*). While
//! dense it counts the cells that differ from the base, and falls back to
//! `Uniform(base)` as soon as that count reaches zero. Homogeneous content on
//! any other value stays dense until [`Chunk::compact`] is called.

use crate::coords::{ChunkSize, LocalCoord};
use crate::error::{GridError, Result};

/// Integer tile identifier stored in each cell
pub type TileId = i32;

/// Storage representation of a chunk (diagnostics only)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Uniform,
    Dense,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Storage {
    Uniform(TileId),
    Dense {
        cells: Box<[TileId]>,
        /// Cells whose id differs from the chunk's base value
        differing: usize,
    },
}

/// A single square chunk of tile ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    size: ChunkSize,
    base: TileId,
    storage: Storage,
}

impl Chunk {
    /// Create a uniform chunk with every cell set to `fill`
    pub fn new(size: ChunkSize, fill: TileId) -> Self {
        Self {
            size,
            base: fill,
            storage: Storage::Uniform(fill),
        }
    }

    pub fn size(&self) -> ChunkSize {
        self.size
    }

    /// Value the chunk was created with
    pub fn base(&self) -> TileId {
        self.base
    }

    pub fn storage_kind(&self) -> StorageKind {
        match self.storage {
            Storage::Uniform(_) => StorageKind::Uniform,
            Storage::Dense { .. } => StorageKind::Dense,
        }
    }

    /// True when the chunk is uniform and holds `value` in every cell
    pub fn is_uniform_of(&self, value: TileId) -> bool {
        matches!(self.storage, Storage::Uniform(v) if v == value)
    }

    /// Get the tile id at local `(x, y)`
    pub fn get(&self, x: i32, y: i32) -> Result<TileId> {
        let index = self.checked_index(x, y)?;
        Ok(self.tile_at(index))
    }

    /// Get the tile id at a local coordinate
    pub fn get_local(&self, local: LocalCoord) -> Result<TileId> {
        self.get(local.x as i32, local.y as i32)
    }

    /// Set the tile id at local `(x, y)`
    ///
    /// Writing the current uniform value is a no-op; any other write to a
    /// uniform chunk promotes it to dense storage.
    pub fn set(&mut self, x: i32, y: i32, id: TileId) -> Result<()> {
        let index = self.checked_index(x, y)?;

        if let Storage::Uniform(value) = self.storage {
            if value == id {
                return Ok(());
            }
            let differing = if value == self.base {
                0
            } else {
                self.size.area()
            };
            self.storage = Storage::Dense {
                cells: vec![value; self.size.area()].into_boxed_slice(),
                differing,
            };
        }

        let base = self.base;
        let mut demote = false;
        if let Storage::Dense { cells, differing } = &mut self.storage {
            let old = std::mem::replace(&mut cells[index], id);
            if old == base && id != base {
                *differing += 1;
            } else if old != base && id == base {
                *differing -= 1;
            }
            demote = *differing == 0;
        }
        if demote {
            self.storage = Storage::Uniform(base);
        }

        Ok(())
    }

    /// Set the tile id at a local coordinate
    pub fn set_local(&mut self, local: LocalCoord, id: TileId) -> Result<()> {
        self.set(local.x as i32, local.y as i32, id)
    }

    /// Track cells against a new base value.
    ///
    /// Recounts a dense chunk once and demotes it to `Uniform(base)` if every
    /// cell already holds `base`.
    pub fn rebase(&mut self, base: TileId) {
        self.base = base;
        let mut demote = false;
        if let Storage::Dense { cells, differing } = &mut self.storage {
            *differing = cells.iter().filter(|&&id| id != base).count();
            demote = *differing == 0;
        }
        if demote {
            self.storage = Storage::Uniform(base);
        }
    }

    /// Demote a homogeneous dense chunk to uniform storage.
    ///
    /// Returns true if the representation changed. Scans every cell.
    pub fn compact(&mut self) -> bool {
        let value = match &self.storage {
            Storage::Uniform(_) => return false,
            Storage::Dense { cells, .. } => {
                let first = cells[0];
                if cells.iter().any(|&id| id != first) {
                    return false;
                }
                first
            }
        };
        self.storage = Storage::Uniform(value);
        true
    }

    /// Iterate the cells whose id differs from `value`, in local index order
    pub fn cells_differing_from(
        &self,
        value: TileId,
    ) -> impl Iterator<Item = (LocalCoord, TileId)> + '_ {
        let range = if self.is_uniform_of(value) {
            0..0
        } else {
            0..self.size.area()
        };
        let edge = self.size.get() as usize;
        range.filter_map(move |index| {
            let id = self.tile_at(index);
            if id == value {
                return None;
            }
            let local = LocalCoord::new((index % edge) as u16, (index / edge) as u16);
            Some((local, id))
        })
    }

    /// Number of cells whose id differs from `value`
    pub fn count_differing_from(&self, value: TileId) -> usize {
        match &self.storage {
            Storage::Uniform(v) if *v == value => 0,
            Storage::Uniform(_) => self.size.area(),
            Storage::Dense { differing, .. } if value == self.base => *differing,
            Storage::Dense { cells, .. } => cells.iter().filter(|&&id| id != value).count(),
        }
    }

    fn tile_at(&self, index: usize) -> TileId {
        match &self.storage {
            Storage::Uniform(value) => *value,
            Storage::Dense { cells, .. } => cells[index],
        }
    }

    fn checked_index(&self, x: i32, y: i32) -> Result<usize> {
        if !self.size.contains(x, y) {
            return Err(GridError::IndexOutOfRange {
                x,
                y,
                size: self.size.get(),
            });
        }
        Ok(y as usize * self.size.get() as usize + x as usize)
    }
}
