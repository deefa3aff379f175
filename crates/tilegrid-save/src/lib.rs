//! Persistence glue between [`SparseChunkWorld`] and a keyed, versioned save
//! container.
//!
//! [`SparseChunkWorld`]: tilegrid_core::SparseChunkWorld

pub mod container;
pub mod error;
pub mod section;
pub mod world_section;

pub use container::{SaveContainer, SaveFile, SectionRef, SAVE_FILE_MAGIC, SAVE_FILE_VERSION};
pub use error::{Result, SaveError};
pub use section::{decode_section, load_section, load_section_into, save_section, SaveSection};
pub use world_section::{
    load_world, load_world_into, save_world, DecodedWorld, WorldSection, WorldSectionHeader,
};
