use thiserror::Error;

/// Errors raised by grid storage and the chunk codec
#[derive(Error, Debug)]
pub enum GridError {
    /// A configuration value was rejected (chunk size, divisor, mismatched chunk)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Local cell coordinates outside `[0, size)`
    #[error("Cell ({x}, {y}) is outside a chunk of size {size}")]
    IndexOutOfRange { x: i32, y: i32, size: u16 },

    /// Encoded chunk was written with a format this build does not read
    #[error("Unsupported chunk format version {found} (expected {expected})")]
    UnsupportedVersion { found: i32, expected: i32 },

    /// Encoded data is structurally invalid
    #[error("Corrupt chunk data: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GridError>;
