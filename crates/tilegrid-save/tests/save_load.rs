use tilegrid_core::{ChunkCoord, SparseChunkWorld};
use tilegrid_save::{
    load_world, load_world_into, save_world, SaveContainer, SaveFile, SaveSection, WorldSection,
};

#[test]
fn test_save_then_load_into_fresh_world() {
    let mut world = SparseChunkWorld::new(16, 0).unwrap();
    world.set_tile(5, 5, 3).unwrap();
    world.set_tile(20, 20, 7).unwrap();

    let mut file = SaveFile::new();
    save_world(&mut file, &world).unwrap();

    let mut loaded = SparseChunkWorld::new(16, 0).unwrap();
    load_world_into(&file, &mut loaded).unwrap();

    assert_eq!(loaded.get_tile(5, 5), 3);
    assert_eq!(loaded.get_tile(20, 20), 7);
    assert_eq!(loaded.get_tile(0, 0), 0);
    assert_eq!(loaded.chunk_count(), 2);
}

#[test]
fn test_round_trip_through_bytes() {
    let mut world = SparseChunkWorld::new(8, -1).unwrap();
    for i in -40..40 {
        world.set_tile(i, i * 3, i).unwrap();
    }
    // Restore one chunk to the default entirely
    world.remove_chunk(ChunkCoord::new(0, 0));

    let mut file = SaveFile::new();
    file.put_section("unrelated", 4, vec![1, 2, 3]);
    save_world(&mut file, &world).unwrap();

    let reread = SaveFile::from_bytes(&file.to_bytes().unwrap()).unwrap();
    assert_eq!(reread.section("unrelated").unwrap().version, 4);
    assert_eq!(
        reread.section(WorldSection::KEY).unwrap().version,
        WorldSection::VERSION
    );

    let loaded = load_world(&reread).unwrap();
    assert_eq!(loaded.chunk_count(), world.chunk_count());
    for y in -130..130 {
        for x in -50..50 {
            assert_eq!(loaded.get_tile(x, y), world.get_tile(x, y), "cell ({}, {})", x, y);
        }
    }
}

#[test]
fn test_round_trip_through_disk() {
    let mut world = SparseChunkWorld::new(32, 0).unwrap();
    world.set_tile(-1, -1, 11).unwrap();
    world.set_tile(1000, -2000, 12).unwrap();

    let mut file = SaveFile::new();
    save_world(&mut file, &world).unwrap();

    let path = std::env::temp_dir().join(format!("tilegrid-save-test-{}.tgsv", std::process::id()));
    file.save_to_path(&path).unwrap();
    let reread = SaveFile::load_from_path(&path);
    let _ = std::fs::remove_file(&path);

    let loaded = load_world(&reread.unwrap()).unwrap();
    assert_eq!(loaded.get_tile(-1, -1), 11);
    assert_eq!(loaded.get_tile(1000, -2000), 12);
    assert_eq!(loaded.chunk_count(), 2);
}

#[test]
fn test_empty_world_round_trip() {
    let world = SparseChunkWorld::new(16, 5).unwrap();
    let mut file = SaveFile::new();
    save_world(&mut file, &world).unwrap();

    let loaded = load_world(&file).unwrap();
    assert_eq!(loaded.chunk_count(), 0);
    assert_eq!(loaded.default_tile(), 5);
    assert_eq!(loaded.get_tile(3, -3), 5);
}
