//! Open set of per-tile properties.
//!
//! Each concrete property type has a [`PropertyKind`]. A tile keeps at most one
//! property per kind, and typed lookups go through [`Property`] instead of
//! inspecting values at runtime.

use serde::{Deserialize, Serialize};

/// Discriminant of a [`TileProperty`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Collision,
    Movement,
    LightEmitter,
    Animation,
    Footstep,
}

/// Blocks movement and optionally line of sight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collision {
    pub solid: bool,
    #[serde(default)]
    pub blocks_sight: bool,
}

/// Walking speed modifier for actors standing on the tile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub speed_multiplier: f32,
}

/// Light emitted from the tile's center
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightEmitter {
    pub radius: f32,
    #[serde(default = "default_intensity")]
    pub intensity: f32,
}

fn default_intensity() -> f32 {
    1.0
}

/// Sprite animation laid out as consecutive frames to the right of the tile's UV rect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animation {
    pub frame_count: u32,
    pub frame_duration_ms: u32,
}

/// Sound played when an actor steps on the tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footstep {
    pub sound: String,
}

/// Tagged union of every property kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TileProperty {
    Collision(Collision),
    Movement(Movement),
    LightEmitter(LightEmitter),
    Animation(Animation),
    Footstep(Footstep),
}

impl TileProperty {
    pub fn kind(&self) -> PropertyKind {
        match self {
            TileProperty::Collision(_) => PropertyKind::Collision,
            TileProperty::Movement(_) => PropertyKind::Movement,
            TileProperty::LightEmitter(_) => PropertyKind::LightEmitter,
            TileProperty::Animation(_) => PropertyKind::Animation,
            TileProperty::Footstep(_) => PropertyKind::Footstep,
        }
    }
}

/// A concrete property type stored in a [`TileProperty`] variant
pub trait Property: Sized + Into<TileProperty> {
    const KIND: PropertyKind;

    /// Borrow the concrete value if `property` is of this kind
    fn from_property(property: &TileProperty) -> Option<&Self>;
}

macro_rules! impl_property {
    ($($ty:ident,)*) => {$(
        impl Property for $ty {
            const KIND: PropertyKind = PropertyKind::$ty;

            fn from_property(property: &TileProperty) -> Option<&Self> {
                match property {
                    TileProperty::$ty(value) => Some(value),
                    _ => None,
                }
            }
        }

        impl From<$ty> for TileProperty {
            fn from(value: $ty) -> Self {
                TileProperty::$ty(value)
            }
        }
    )*};
}

impl_property! {
    Collision,
    Movement,
    LightEmitter,
    Animation,
    Footstep,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        let p: TileProperty = Movement { speed_multiplier: 0.5 }.into();
        assert_eq!(p.kind(), PropertyKind::Movement);
        assert_eq!(Movement::KIND, PropertyKind::Movement);
        assert_eq!(
            Movement::from_property(&p),
            Some(&Movement { speed_multiplier: 0.5 })
        );
        assert_eq!(Collision::from_property(&p), None);
    }

    #[test]
    fn test_tagged_json() {
        let p: TileProperty =
            serde_json::from_str(r#"{"type":"light_emitter","radius":3.0}"#).unwrap();
        assert_eq!(
            p,
            TileProperty::LightEmitter(LightEmitter {
                radius: 3.0,
                intensity: 1.0,
            })
        );

        let json = serde_json::to_string(&TileProperty::Collision(Collision {
            solid: true,
            blocks_sight: false,
        }))
        .unwrap();
        assert_eq!(json, r#"{"type":"collision","solid":true,"blocks_sight":false}"#);
    }
}
