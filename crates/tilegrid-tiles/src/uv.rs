use serde::{Deserialize, Serialize};

use crate::error::TileError;

/// Texture-space rectangle of a tile's sprite.
///
/// Always satisfies `u_min <= u_max` and `v_min <= v_max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawUvRect")]
pub struct UvRect {
    u_min: f32,
    v_min: f32,
    u_max: f32,
    v_max: f32,
}

#[derive(Deserialize)]
struct RawUvRect {
    u_min: f32,
    v_min: f32,
    u_max: f32,
    v_max: f32,
}

impl TryFrom<RawUvRect> for UvRect {
    type Error = TileError;

    fn try_from(raw: RawUvRect) -> Result<Self, TileError> {
        UvRect::new(raw.u_min, raw.v_min, raw.u_max, raw.v_max)
    }
}

impl UvRect {
    pub fn new(u_min: f32, v_min: f32, u_max: f32, v_max: f32) -> Result<Self, TileError> {
        if ![u_min, v_min, u_max, v_max].iter().all(|v| v.is_finite()) {
            return Err(TileError::InvalidArgument(
                "UV coordinates must be finite".to_string(),
            ));
        }
        if u_min > u_max || v_min > v_max {
            return Err(TileError::InvalidArgument(format!(
                "inverted UV rect ({}, {})..({}, {})",
                u_min, v_min, u_max, v_max
            )));
        }
        Ok(UvRect {
            u_min,
            v_min,
            u_max,
            v_max,
        })
    }

    /// Build from a pixel rectangle inside an atlas texture
    pub fn from_atlas_pixels(
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        atlas_width: u32,
        atlas_height: u32,
    ) -> Result<Self, TileError> {
        if width == 0 || height == 0 {
            return Err(TileError::InvalidArgument(format!(
                "degenerate tile span {}x{}",
                width, height
            )));
        }
        if atlas_width == 0 || atlas_height == 0 {
            return Err(TileError::InvalidArgument(format!(
                "degenerate atlas {}x{}",
                atlas_width, atlas_height
            )));
        }
        let right = x as u64 + width as u64;
        let bottom = y as u64 + height as u64;
        if right > atlas_width as u64 || bottom > atlas_height as u64 {
            return Err(TileError::InvalidArgument(format!(
                "tile span ({}, {}) {}x{} exceeds atlas {}x{}",
                x, y, width, height, atlas_width, atlas_height
            )));
        }

        let aw = atlas_width as f32;
        let ah = atlas_height as f32;
        UvRect::new(
            x as f32 / aw,
            y as f32 / ah,
            right as f32 / aw,
            bottom as f32 / ah,
        )
    }

    pub fn u_min(&self) -> f32 {
        self.u_min
    }

    pub fn v_min(&self) -> f32 {
        self.v_min
    }

    pub fn u_max(&self) -> f32 {
        self.u_max
    }

    pub fn v_max(&self) -> f32 {
        self.v_max
    }

    pub fn width(&self) -> f32 {
        self.u_max - self.u_min
    }

    pub fn height(&self) -> f32 {
        self.v_max - self.v_min
    }
}
