pub mod authoring;
pub mod error;
pub mod library;
pub mod property;
pub mod tile_def;
pub mod uv;

pub use authoring::{TileAuthoring, UvSource};
pub use error::TileError;
pub use library::{TileLibrary, TileLibraryBuilder};
pub use property::{
    Animation, Collision, Footstep, LightEmitter, Movement, Property, PropertyKind, TileProperty,
};
pub use tile_def::TileDef;
pub use uv::UvRect;
