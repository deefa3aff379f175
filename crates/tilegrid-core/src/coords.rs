//! Conversions between absolute cell space and chunk space.
//!
//! Cell coordinates are unbounded signed integers. A cell belongs to the chunk
//! found by *floor* division against the chunk size, so `-1` lands in chunk
//! `-1` at local offset `size - 1` rather than in chunk `0`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::error::{GridError, Result};

/// Largest supported chunk edge. Local indices are stored as `u16`, so
/// `size * size` must not exceed 65536.
pub const MAX_CHUNK_SIZE: u16 = 256;

/// Floor division for a positive divisor.
///
/// ```
/// use tilegrid_core::coords::floor_div;
///
/// assert_eq!(floor_div(-1, 32).unwrap(), -1);
/// assert_eq!(floor_div(-33, 32).unwrap(), -2);
/// assert_eq!(floor_div(31, 32).unwrap(), 0);
/// ```
pub fn floor_div(a: i32, b: i32) -> Result<i32> {
    if b <= 0 {
        return Err(GridError::InvalidArgument(format!(
            "divisor must be positive, got {}",
            b
        )));
    }
    Ok(a.div_euclid(b))
}

/// Floor modulo for a positive divisor; the result is always in `[0, b)`.
///
/// ```
/// use tilegrid_core::coords::floor_mod;
///
/// assert_eq!(floor_mod(-1, 32).unwrap(), 31);
/// assert_eq!(floor_mod(32, 32).unwrap(), 0);
/// ```
pub fn floor_mod(a: i32, b: i32) -> Result<i32> {
    if b <= 0 {
        return Err(GridError::InvalidArgument(format!(
            "divisor must be positive, got {}",
            b
        )));
    }
    Ok(a.rem_euclid(b))
}

/// Validated chunk edge length in `1..=MAX_CHUNK_SIZE`.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct ChunkSize(u16);

impl ChunkSize {
    pub fn new(size: i32) -> Result<Self> {
        if size <= 0 || size > MAX_CHUNK_SIZE as i32 {
            return Err(GridError::InvalidArgument(format!(
                "chunk size must be in 1..={}, got {}",
                MAX_CHUNK_SIZE, size
            )));
        }
        Ok(ChunkSize(size as u16))
    }

    pub const fn get(self) -> u16 {
        self.0
    }

    pub const fn as_i32(self) -> i32 {
        self.0 as i32
    }

    /// Number of cells in one chunk
    pub const fn area(self) -> usize {
        self.0 as usize * self.0 as usize
    }

    /// Check that local `(x, y)` lies inside a chunk of this size
    pub fn contains(self, x: i32, y: i32) -> bool {
        let size = self.as_i32();
        (0..size).contains(&x) && (0..size).contains(&y)
    }
}

impl TryFrom<i32> for ChunkSize {
    type Error = GridError;

    fn try_from(size: i32) -> Result<Self> {
        ChunkSize::new(size)
    }
}

impl From<ChunkSize> for i32 {
    fn from(size: ChunkSize) -> i32 {
        size.as_i32()
    }
}

impl fmt::Display for ChunkSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Absolute world cell address
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

impl CellCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        CellCoord { x, y }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Coordinate of a chunk in the grid.
///
/// Orders row-major (by `y`, then `x`), which gives saves a stable chunk order.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        ChunkCoord { x, y }
    }

    /// Check that at least one `i32` world cell falls inside this chunk.
    ///
    /// Chunks past `i32::MAX.div_euclid(size)` (or below
    /// `i32::MIN.div_euclid(size)`) on either axis hold no addressable cell.
    ///
    /// # Examples
    ///
    /// ```
    /// use tilegrid_core::{ChunkCoord, ChunkSize};
    ///
    /// let size = ChunkSize::new(16).unwrap();
    /// assert!(ChunkCoord::new(134_217_727, 0).is_addressable(size));
    /// assert!(!ChunkCoord::new(134_217_728, 0).is_addressable(size));
    /// ```
    pub fn is_addressable(self, size: ChunkSize) -> bool {
        let size = size.as_i32();
        let range = i32::MIN.div_euclid(size)..=i32::MAX.div_euclid(size);
        range.contains(&self.x) && range.contains(&self.y)
    }
}

impl Ord for ChunkCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for ChunkCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

/// Cell position inside a chunk, each component in `[0, size)`
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct LocalCoord {
    pub x: u16,
    pub y: u16,
}

impl LocalCoord {
    pub const fn new(x: u16, y: u16) -> Self {
        LocalCoord { x, y }
    }

    /// Row-major index `y * size + x`, as written by the chunk codec
    pub fn index(self, size: ChunkSize) -> u16 {
        // size <= 256 keeps the largest index at 65535
        (self.y as u32 * size.get() as u32 + self.x as u32) as u16
    }

    /// Inverse of [`LocalCoord::index`]; fails when the index is past the chunk area
    pub fn from_index(index: u16, size: ChunkSize) -> Result<Self> {
        if index as usize >= size.area() {
            return Err(GridError::Corrupt(format!(
                "local index {} outside chunk of size {}",
                index, size
            )));
        }
        let edge = size.get();
        Ok(LocalCoord {
            x: index % edge,
            y: index / edge,
        })
    }
}

/// Chunk containing a world cell
pub fn world_to_chunk(cell: CellCoord, size: ChunkSize) -> ChunkCoord {
    let size = size.as_i32();
    ChunkCoord {
        x: cell.x.div_euclid(size),
        y: cell.y.div_euclid(size),
    }
}

/// Position of a world cell within its chunk
pub fn world_to_local(cell: CellCoord, size: ChunkSize) -> LocalCoord {
    let size = size.as_i32();
    LocalCoord {
        x: cell.x.rem_euclid(size) as u16,
        y: cell.y.rem_euclid(size) as u16,
    }
}

/// World cell at local `(0, 0)` of a chunk.
///
/// Returns `None` when that cell lies outside the `i32` range, which happens
/// for the lowest addressable chunk when `size` does not divide `2^31`.
pub fn chunk_origin(chunk: ChunkCoord, size: ChunkSize) -> Option<CellCoord> {
    let size = size.as_i32();
    Some(CellCoord {
        x: chunk.x.checked_mul(size)?,
        y: chunk.y.checked_mul(size)?,
    })
}

/// World cell for a chunk coordinate plus local offset, or `None` if that
/// cell cannot be addressed with `i32` coordinates
pub fn local_to_world(
    chunk: ChunkCoord,
    local: LocalCoord,
    size: ChunkSize,
) -> Option<CellCoord> {
    let size = i64::from(size.as_i32());
    let x = i64::from(chunk.x) * size + i64::from(local.x);
    let y = i64::from(chunk.y) * size + i64::from(local.y);
    Some(CellCoord {
        x: i32::try_from(x).ok()?,
        y: i32::try_from(y).ok()?,
    })
}
