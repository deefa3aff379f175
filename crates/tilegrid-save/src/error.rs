use thiserror::Error;

use tilegrid_core::GridError;

/// Errors raised while writing or reading save data
#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing save section '{0}'")]
    MissingSection(String),

    #[error("Section '{key}' has version {found}, this build reads version {supported}")]
    UnsupportedSection {
        key: String,
        found: u32,
        supported: u32,
    },

    #[error("Corrupt save data: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, SaveError>;
