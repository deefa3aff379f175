pub mod commands;
pub mod config;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tilegrid_save::SaveFile;
use tilegrid_tiles::TileLibrary;

use config::Config;

#[derive(Debug, Parser)]
#[command(name = "tilegrid", version, about = "Inspect tilegrid save files and tile libraries")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the sections of a save file and the chunks of its world
    Inspect {
        /// Path to the save file
        save: PathBuf,
    },
    /// Check that a saved world loads and survives a save/load round trip
    Verify {
        /// Path to the save file
        save: PathBuf,
        /// Tile library every stored tile id must be defined in
        #[arg(long)]
        library: Option<PathBuf>,
    },
    /// Validate a JSON tile library and summarize it
    Library {
        /// Path to the JSON library
        path: PathBuf,
    },
}

/// Execute a command and return its report
pub fn run(command: Command, config: &Config) -> anyhow::Result<String> {
    match command {
        Command::Inspect { save } => {
            let file = load_save(&save)?;
            commands::inspect(&file)
        }
        Command::Verify { save, library } => {
            let file = load_save(&save)?;
            let library = match library {
                Some(path) => Some(TileLibrary::from_json_str(&read_text(&path)?)?),
                None => None,
            };
            commands::verify(&file, config, library.as_ref())
        }
        Command::Library { path } => commands::library(&read_text(&path)?),
    }
}

fn load_save(path: &Path) -> anyhow::Result<SaveFile> {
    tracing::info!(path = %path.display(), "reading save file");
    SaveFile::load_from_path(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
