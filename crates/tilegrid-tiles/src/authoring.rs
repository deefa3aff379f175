//! Authoring-time tile descriptions, consumed once to build a [`TileLibrary`].
//!
//! [`TileLibrary`]: crate::library::TileLibrary

use serde::{Deserialize, Serialize};

use tilegrid_core::TileId;

use crate::error::TileError;
use crate::property::TileProperty;
use crate::tile_def::TileDef;
use crate::uv::UvRect;

/// Where a tile's sprite lives in the atlas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UvSource {
    /// Normalized texture coordinates
    Uv {
        u_min: f32,
        v_min: f32,
        u_max: f32,
        v_max: f32,
    },
    /// Pixel span inside an atlas of known size
    Atlas {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        atlas_width: u32,
        atlas_height: u32,
    },
}

impl UvSource {
    pub fn resolve(&self) -> Result<UvRect, TileError> {
        match *self {
            UvSource::Uv {
                u_min,
                v_min,
                u_max,
                v_max,
            } => UvRect::new(u_min, v_min, u_max, v_max),
            UvSource::Atlas {
                x,
                y,
                width,
                height,
                atlas_width,
                atlas_height,
            } => UvRect::from_atlas_pixels(x, y, width, height, atlas_width, atlas_height),
        }
    }
}

/// One authored tile entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileAuthoring {
    pub tile_id: TileId,
    pub name: String,
    pub uv: UvSource,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Applied in order; a later property replaces an earlier one of the same kind
    #[serde(default)]
    pub properties: Vec<TileProperty>,
}

impl TileAuthoring {
    /// Validate and convert into a runtime definition
    pub fn into_def(self) -> Result<TileDef, TileError> {
        let uv = self.uv.resolve().map_err(|e| match e {
            TileError::InvalidArgument(msg) => {
                TileError::InvalidArgument(format!("tile {} ({}): {}", self.tile_id, self.name, msg))
            }
            other => other,
        })?;

        let mut def = TileDef::new(self.tile_id, self.name, uv);
        for tag in self.tags {
            def = def.with_tag(tag);
        }
        for property in self.properties {
            if let Some(previous) = def.set_property(property) {
                tracing::debug!(
                    tile_id = def.tile_id,
                    kind = ?previous.kind(),
                    "property replaced by a later entry of the same kind"
                );
            }
        }
        Ok(def)
    }
}
