use std::env;

use tilegrid_core::TileId;

/// Tool configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// tracing-subscriber filter directive
    pub log_filter: String,
    /// Chunk size a verified save must use
    pub expect_chunk_size: Option<i32>,
    /// Default tile a verified save must use
    pub expect_default_tile: Option<TileId>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            expect_chunk_size: None,
            expect_default_tile: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let log_filter = env::var("TILEGRID_LOG").unwrap_or_else(|_| "info".to_string());
        let expect_chunk_size = env::var("TILEGRID_EXPECT_CHUNK_SIZE")
            .ok()
            .map(|v| v.parse())
            .transpose()?;
        let expect_default_tile = env::var("TILEGRID_EXPECT_DEFAULT_TILE")
            .ok()
            .map(|v| v.parse())
            .transpose()?;

        Ok(Self {
            log_filter,
            expect_chunk_size,
            expect_default_tile,
        })
    }
}
