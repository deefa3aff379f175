use thiserror::Error;

/// Errors raised while building a tile library
#[derive(Error, Debug)]
pub enum TileError {
    /// Degenerate or inverted UV spans, empty atlases and similar input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Authoring data error: {0}")]
    Json(#[from] serde_json::Error),
}
