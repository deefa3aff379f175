use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use tilegrid_core::TileId;

use crate::property::{Property, PropertyKind, TileProperty};
use crate::uv::UvRect;

/// Metadata describing one tile id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileDef {
    pub tile_id: TileId,
    pub name: String,
    pub uv: UvRect,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    tags: BTreeSet<String>,
    /// At most one property per kind, always keyed by the property's own kind
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        with = "property_list"
    )]
    properties: BTreeMap<PropertyKind, TileProperty>,
}

/// Properties travel as a plain list and are re-keyed by `kind()` on the way
/// in, so a serialized map key can never disagree with its value
mod property_list {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};

    use crate::property::{PropertyKind, TileProperty};

    pub fn serialize<S: Serializer>(
        properties: &BTreeMap<PropertyKind, TileProperty>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(properties.values())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<PropertyKind, TileProperty>, D::Error> {
        let list = Vec::<TileProperty>::deserialize(deserializer)?;
        Ok(list.into_iter().map(|p| (p.kind(), p)).collect())
    }
}

impl TileDef {
    pub fn new(tile_id: TileId, name: impl Into<String>, uv: UvRect) -> Self {
        Self {
            tile_id,
            name: name.into(),
            uv,
            tags: BTreeSet::new(),
            properties: BTreeMap::new(),
        }
    }

    /// Builder pattern: add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Builder pattern: add a property, replacing any of the same kind
    pub fn with_property(mut self, property: impl Into<TileProperty>) -> Self {
        self.set_property(property);
        self
    }

    /// Store a property. Returns the previous property of the same kind.
    pub fn set_property(&mut self, property: impl Into<TileProperty>) -> Option<TileProperty> {
        let property = property.into();
        self.properties.insert(property.kind(), property)
    }

    /// Typed lookup, e.g. `def.property::<Collision>()`
    pub fn property<P: Property>(&self) -> Option<&P> {
        self.properties.get(&P::KIND).and_then(P::from_property)
    }

    pub fn has_property(&self, kind: PropertyKind) -> bool {
        self.properties.contains_key(&kind)
    }

    pub fn properties(&self) -> impl Iterator<Item = &TileProperty> {
        self.properties.values()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }
}
