//! Report builders behind each subcommand.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use anyhow::{bail, Context};
use tilegrid_core::{local_to_world, ChunkCoord, LocalCoord, SparseChunkWorld, TileId};
use tilegrid_save::{load_world, save_world, SaveContainer, SaveFile, SaveSection, WorldSection};
use tilegrid_tiles::TileLibrary;

use crate::config::Config;

/// Describe every section of a save and, when present, the stored world
pub fn inspect(file: &SaveFile) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(out, "sections: {}", file.len())?;
    for (key, section) in file.sections() {
        writeln!(
            out,
            "  {} v{} ({} bytes)",
            key,
            section.version,
            section.bytes.len()
        )?;
    }

    if file.section(WorldSection::KEY).is_none() {
        return Ok(out);
    }

    let world = load_world(file).context("failed to load world section")?;
    let default_tile = world.default_tile();
    writeln!(out, "world:")?;
    writeln!(out, "  chunk size: {}", world.chunk_size())?;
    writeln!(out, "  default tile: {}", default_tile)?;
    writeln!(out, "  chunks: {}", world.chunk_count())?;

    let mut chunks: Vec<_> = world.chunks().collect();
    chunks.sort_by_key(|(coord, _)| *coord);
    for (coord, chunk) in chunks {
        writeln!(
            out,
            "    {} {:?} {} non-default",
            coord,
            chunk.storage_kind(),
            chunk.count_differing_from(default_tile)
        )?;
    }
    Ok(out)
}

/// Load the world, check it against the configured expectations and make
/// sure a save/load round trip reproduces it cell for cell
pub fn verify(
    file: &SaveFile,
    config: &Config,
    library: Option<&TileLibrary>,
) -> anyhow::Result<String> {
    let world = load_world(file).context("failed to load world section")?;

    if let Some(expected) = config.expect_chunk_size {
        if world.chunk_size().as_i32() != expected {
            bail!(
                "chunk size {} does not match expected {}",
                world.chunk_size(),
                expected
            );
        }
    }
    if let Some(expected) = config.expect_default_tile {
        if world.default_tile() != expected {
            bail!(
                "default tile {} does not match expected {}",
                world.default_tile(),
                expected
            );
        }
    }

    let mut resaved = SaveFile::new();
    save_world(&mut resaved, &world)?;
    let reloaded = load_world(&SaveFile::from_bytes(&resaved.to_bytes()?)?)?;

    if reloaded.chunk_count() != world.chunk_count() {
        bail!(
            "round trip produced {} chunks, expected {}",
            reloaded.chunk_count(),
            world.chunk_count()
        );
    }
    let mut cells = 0usize;
    for (coord, _) in world.chunks() {
        cells += compare_chunk(&world, &reloaded, coord)?;
    }
    tracing::debug!(chunks = world.chunk_count(), cells, "round trip verified");

    let mut out = String::new();
    writeln!(
        out,
        "ok: {} chunks, {} cells round-tripped",
        world.chunk_count(),
        cells
    )?;

    if let Some(library) = library {
        let unknown = unknown_tiles(&world, library);
        if !unknown.is_empty() {
            let ids: Vec<String> = unknown.iter().map(|id| id.to_string()).collect();
            bail!("tile ids missing from library: {}", ids.join(", "));
        }
        writeln!(out, "ok: every stored tile id is defined in the library")?;
    }
    Ok(out)
}

/// Summarize a tile library file
pub fn library(json: &str) -> anyhow::Result<String> {
    let library = TileLibrary::from_json_str(json).context("invalid tile library")?;

    let mut defs: Vec<_> = library.iter().collect();
    defs.sort_by_key(|def| def.tile_id);

    let mut tags: BTreeMap<&str, usize> = BTreeMap::new();
    for def in &defs {
        for tag in def.tags() {
            *tags.entry(tag).or_default() += 1;
        }
    }

    let mut out = String::new();
    writeln!(out, "tiles: {}", library.len())?;
    for def in defs {
        let kinds: Vec<String> = def
            .properties()
            .map(|p| format!("{:?}", p.kind()))
            .collect();
        writeln!(out, "  {} {} [{}]", def.tile_id, def.name, kinds.join(", "))?;
    }
    if !tags.is_empty() {
        writeln!(out, "tags:")?;
        for (tag, count) in tags {
            writeln!(out, "  {}: {}", tag, count)?;
        }
    }
    Ok(out)
}

/// Compare every addressable cell of one chunk, returning how many were checked
fn compare_chunk(
    expected: &SparseChunkWorld,
    actual: &SparseChunkWorld,
    coord: ChunkCoord,
) -> anyhow::Result<usize> {
    let size = expected.chunk_size();
    let edge = size.get();
    let mut compared = 0;
    for ly in 0..edge {
        for lx in 0..edge {
            // Edge chunks can extend past the i32 range
            let Some(cell) = local_to_world(coord, LocalCoord::new(lx, ly), size) else {
                continue;
            };
            let want = expected.get_tile(cell.x, cell.y);
            let got = actual.get_tile(cell.x, cell.y);
            if want != got {
                bail!(
                    "cell {} in chunk {} reads {} after round trip, expected {}",
                    cell,
                    coord,
                    got,
                    want
                );
            }
            compared += 1;
        }
    }
    Ok(compared)
}

fn unknown_tiles(world: &SparseChunkWorld, library: &TileLibrary) -> BTreeSet<TileId> {
    let mut unknown = BTreeSet::new();
    if !library.contains(world.default_tile()) {
        unknown.insert(world.default_tile());
    }
    for (_, chunk) in world.chunks() {
        for (_, id) in chunk.cells_differing_from(world.default_tile()) {
            if !library.contains(id) {
                unknown.insert(id);
            }
        }
    }
    unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY_JSON: &str = r#"[
        { "tile_id": 0, "name": "void",
          "uv": { "kind": "uv", "u_min": 0.0, "v_min": 0.0, "u_max": 0.0, "v_max": 0.0 } },
        { "tile_id": 3, "name": "grass",
          "uv": { "kind": "atlas", "x": 0, "y": 0, "width": 16, "height": 16,
                  "atlas_width": 64, "atlas_height": 64 },
          "tags": ["ground"],
          "properties": [{ "type": "movement", "speed_multiplier": 1.0 }] },
        { "tile_id": 4, "name": "wall",
          "uv": { "kind": "atlas", "x": 16, "y": 0, "width": 16, "height": 16,
                  "atlas_width": 64, "atlas_height": 64 },
          "tags": ["solid"],
          "properties": [{ "type": "collision", "solid": true }] }
    ]"#;

    fn sample_save() -> SaveFile {
        let mut world = SparseChunkWorld::new(16, 0).unwrap();
        world.set_tile(5, 5, 3).unwrap();
        world.set_tile(-20, 40, 4).unwrap();
        let mut file = SaveFile::new();
        save_world(&mut file, &world).unwrap();
        file.put_section("player", 2, vec![1, 2, 3]);
        file
    }

    #[test]
    fn test_inspect_lists_sections_and_chunks() {
        let out = inspect(&sample_save()).unwrap();
        assert!(out.contains("sections: 2"));
        assert!(out.contains("player v2 (3 bytes)"));
        assert!(out.contains("chunk size: 16"));
        assert!(out.contains("chunks: 2"));
        assert!(out.contains("[0, 0] Dense 1 non-default"));
        assert!(out.contains("[-2, 2] Dense 1 non-default"));
    }

    #[test]
    fn test_inspect_without_world() {
        let mut file = SaveFile::new();
        file.put_section("player", 1, vec![]);
        let out = inspect(&file).unwrap();
        assert!(!out.contains("world:"));
    }

    #[test]
    fn test_verify_round_trip() {
        let out = verify(&sample_save(), &Config::default(), None).unwrap();
        assert!(out.starts_with("ok: 2 chunks, 512 cells"));
    }

    #[test]
    fn test_verify_expectations() {
        let config = Config {
            expect_chunk_size: Some(32),
            ..Config::default()
        };
        assert!(verify(&sample_save(), &config, None).is_err());

        let config = Config {
            expect_chunk_size: Some(16),
            expect_default_tile: Some(0),
            ..Config::default()
        };
        assert!(verify(&sample_save(), &config, None).is_ok());
    }

    #[test]
    fn test_verify_against_library() {
        let library = TileLibrary::from_json_str(LIBRARY_JSON).unwrap();
        assert!(verify(&sample_save(), &Config::default(), Some(&library)).is_ok());

        let partial =
            TileLibrary::from_json_str(&LIBRARY_JSON.replace("\"tile_id\": 4", "\"tile_id\": 5"))
                .unwrap();
        let err = verify(&sample_save(), &Config::default(), Some(&partial)).unwrap_err();
        assert!(err.to_string().contains("4"));
    }

    #[test]
    fn test_verify_chunks_at_the_edge_of_the_world() {
        let mut world = SparseChunkWorld::new(3, 0).unwrap();
        world.set_tile(i32::MIN, i32::MIN, 1).unwrap();
        world.set_tile(i32::MAX, i32::MAX, 2).unwrap();
        let mut file = SaveFile::new();
        save_world(&mut file, &world).unwrap();

        // Size 3 does not divide 2^31, so both edge chunks reach one row and
        // one column past the i32 range and only 2x2 of their cells exist
        let out = verify(&file, &Config::default(), None).unwrap();
        assert!(out.starts_with("ok: 2 chunks, 8 cells"), "{}", out);
    }

    #[test]
    fn test_verify_rejects_unreachable_chunk() {
        let mut world = SparseChunkWorld::new(16, 0).unwrap();
        world.set_tile(0, 0, 1).unwrap();
        let mut file = SaveFile::new();
        save_world(&mut file, &world).unwrap();

        let mut bytes = file.section(WorldSection::KEY).unwrap().bytes.to_vec();
        bytes[16..20].copy_from_slice(&i32::MAX.to_le_bytes());
        file.put_section(WorldSection::KEY, WorldSection::VERSION, bytes);

        assert!(verify(&file, &Config::default(), None).is_err());
        assert!(inspect(&file).is_err());
    }

    #[test]
    fn test_verify_missing_world() {
        assert!(verify(&SaveFile::new(), &Config::default(), None).is_err());
    }

    #[test]
    fn test_library_summary() {
        let out = library(LIBRARY_JSON).unwrap();
        assert!(out.contains("tiles: 3"));
        assert!(out.contains("4 wall [Collision]"));
        assert!(out.contains("ground: 1"));
        assert!(library("[]").unwrap().contains("tiles: 0"));
        assert!(library("{").is_err());
    }
}
