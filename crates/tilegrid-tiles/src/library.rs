//! Immutable tile id → metadata table.
//!
//! Lookups return `Option`: tile ids may appear in the grid before anyone
//! registers a definition for them.

use std::collections::HashMap;

use tilegrid_core::TileId;

use crate::authoring::TileAuthoring;
use crate::error::TileError;
use crate::tile_def::TileDef;
use crate::uv::UvRect;

/// Mutable staging area for a [`TileLibrary`]
#[derive(Debug, Clone, Default)]
pub struct TileLibraryBuilder {
    defs: HashMap<TileId, TileDef>,
}

impl TileLibraryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a definition by tile id (last write wins).
    ///
    /// # Arguments
    ///
    /// * `def` - Definition keyed by its `tile_id`
    ///
    /// Returns the replaced definition, if any.
    pub fn set(&mut self, def: TileDef) -> Option<TileDef> {
        let previous = self.defs.insert(def.tile_id, def);
        if let Some(previous) = &previous {
            tracing::warn!(
                tile_id = previous.tile_id,
                name = %previous.name,
                "tile definition replaced"
            );
        }
        previous
    }

    /// Builder pattern: insert a definition
    pub fn with(mut self, def: TileDef) -> Self {
        self.set(def);
        self
    }

    pub fn build(self) -> TileLibrary {
        TileLibrary { defs: self.defs }
    }
}

/// Read-only lookup table built once from authoring data
#[derive(Debug, Clone, Default)]
pub struct TileLibrary {
    defs: HashMap<TileId, TileDef>,
}

impl TileLibrary {
    pub fn builder() -> TileLibraryBuilder {
        TileLibraryBuilder::new()
    }

    /// Validate every authored entry and freeze the result
    pub fn from_authoring(
        entries: impl IntoIterator<Item = TileAuthoring>,
    ) -> Result<Self, TileError> {
        let mut builder = TileLibraryBuilder::new();
        for entry in entries {
            builder.set(entry.into_def()?);
        }
        let library = builder.build();
        tracing::debug!(tiles = library.len(), "tile library built");
        Ok(library)
    }

    /// Parse a JSON array of authored entries.
    ///
    /// # Errors
    ///
    /// `TileError::Json` for malformed input, `TileError::InvalidArgument`
    /// for an entry whose UV source does not validate.
    pub fn from_json_str(json: &str) -> Result<Self, TileError> {
        let entries: Vec<TileAuthoring> = serde_json::from_str(json)?;
        Self::from_authoring(entries)
    }

    pub fn try_get(&self, tile_id: TileId) -> Option<&TileDef> {
        self.defs.get(&tile_id)
    }

    /// Hot-path UV lookup.
    ///
    /// Unknown ids return `None`; nothing is allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use tilegrid_tiles::{TileDef, TileLibrary, UvRect};
    ///
    /// let uv = UvRect::new(0.0, 0.0, 0.5, 0.5).unwrap();
    /// let library = TileLibrary::builder()
    ///     .with(TileDef::new(5, "grass", uv))
    ///     .build();
    ///
    /// assert_eq!(library.try_get_uv(5), Some(uv));
    /// assert_eq!(library.try_get_uv(6), None);
    /// ```
    pub fn try_get_uv(&self, tile_id: TileId) -> Option<UvRect> {
        self.defs.get(&tile_id).map(|def| def.uv)
    }

    pub fn contains(&self, tile_id: TileId) -> bool {
        self.defs.contains_key(&tile_id)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Iterate definitions. Order carries no meaning.
    pub fn iter(&self) -> impl Iterator<Item = &TileDef> {
        self.defs.values()
    }

    /// Definitions carrying `tag`
    pub fn with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a TileDef> + 'a {
        self.defs.values().filter(move |def| def.has_tag(tag))
    }
}
