//! Built-in catalog and world generation tests.

use blockgrid_engine::grid::{Cell, Layer, TileGrid};
use blockgrid_engine::registry::{BlockId, BlockRegistry};
use blockgrid_server::{block, worldgen};

#[test]
fn catalog_builds_without_dropping_anything() {
    let registry = BlockRegistry::build(block::FACTORIES);

    assert_eq!(registry.len(), block::FACTORIES.len());
    assert_eq!(registry.capacity(), block::FACTORIES.len());
}

#[test]
fn constants_match_registration_order() {
    let registry = BlockRegistry::build(block::FACTORIES);

    // All catalog entries use the sentinel, so ids are dense in list order.
    let expected = [
        (block::DIRT, "Dirt"),
        (block::GRASS, "Grass"),
        (block::STONE, "Stone"),
        (block::SAND, "Sand"),
        (block::LOG, "Log"),
        (block::LEAVES, "Leaves"),
        (block::BRICK, "Brick"),
        (block::GLASS, "Glass"),
    ];
    for (id, name) in expected {
        assert_eq!(registry.lookup(id).unwrap().name, name);
    }
    let listed: Vec<BlockId> = registry.enumerate().map(|(id, _)| id).collect();
    assert_eq!(listed, (0u16..8).map(BlockId).collect::<Vec<_>>());
}

#[test]
fn every_block_has_a_sprite() {
    let registry = BlockRegistry::build(block::FACTORIES);

    for (id, _) in registry.enumerate() {
        let def = registry.lookup(id).unwrap();
        assert!(def.sprite.0.starts_with("blocks/"), "{:?}", def);
    }
}

#[test]
fn worldgen_lays_out_the_expected_strata() {
    let registry = BlockRegistry::build(block::FACTORIES);
    let grid = TileGrid::new();

    let placed = worldgen::generate_main_map(&grid, &registry, 4).unwrap();

    // 9 columns, each: 1 grass + 3 dirt + 5 stone foreground, 9 backdrop.
    assert_eq!(placed, 9 * 18);

    let fg = |x, y| grid.query(Layer::Foreground, Cell::new(x, y)).unwrap().block;
    assert_eq!(fg(0, worldgen::SURFACE_Y), block::GRASS);
    assert_eq!(fg(0, worldgen::SURFACE_Y - 1), block::DIRT);
    assert_eq!(fg(0, worldgen::SURFACE_Y - 3), block::DIRT);
    assert_eq!(fg(0, worldgen::SURFACE_Y - 4), block::STONE);
    assert_eq!(fg(-4, worldgen::FLOOR_Y), block::STONE);

    // Nothing above the surface, backdrop behind the whole column.
    assert!(grid.query(Layer::Foreground, Cell::new(0, worldgen::SURFACE_Y + 1)).is_none());
    let backdrop = grid
        .query(Layer::Background, Cell::new(0, worldgen::SURFACE_Y))
        .unwrap();
    assert_eq!(backdrop.block, block::STONE);
    assert!(!backdrop.collidable);
}

#[test]
fn worldgen_never_overwrites_existing_cells() {
    let registry = BlockRegistry::build(block::FACTORIES);
    let grid = TileGrid::new();

    worldgen::generate_main_map(&grid, &registry, 2).unwrap();
    let second_pass = worldgen::generate_main_map(&grid, &registry, 2).unwrap();

    assert_eq!(second_pass, 0);
}
