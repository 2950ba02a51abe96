//! Interaction state machine tests: selection cycling, mode handling, the
//! reach gate, the preview ladder, and request emission.

use blockgrid_engine::grid::{Cell, Layer, TileGrid, WorldPos};
use blockgrid_engine::interact::{
    BuildMode, CursorPreview, InteractionState, MutationRequest, NoBodies, TickInput,
};
use blockgrid_engine::registry::{AssetHandle, BlockId, BlockRegistry, BlockSpec};

fn dirt() -> BlockSpec {
    BlockSpec {
        declared_id: None,
        name: "Dirt",
        sprite: AssetHandle("blocks/dirt"),
        place_sound: Some(AssetHandle("sounds/thud")),
    }
}

fn stone() -> BlockSpec {
    BlockSpec {
        declared_id: None,
        name: "Stone",
        sprite: AssetHandle("blocks/stone"),
        place_sound: Some(AssetHandle("sounds/tap")),
    }
}

fn glass() -> BlockSpec {
    BlockSpec {
        declared_id: None,
        name: "Glass",
        sprite: AssetHandle("blocks/glass"),
        place_sound: None,
    }
}

fn catalog() -> BlockRegistry {
    BlockRegistry::build(&[dirt, stone, glass])
}

/// A state anchored at the origin cell's center, in build mode.
fn build_state(registry: &BlockRegistry) -> InteractionState {
    let mut state = InteractionState::new(registry);
    state.set_anchor(Cell::new(0, 0).center());
    state.toggle_mode();
    state
}

fn tick_at(cell: Cell) -> TickInput {
    TickInput {
        pointer: cell.center(),
        ..TickInput::default()
    }
}

#[test]
fn defaults_are_destroy_mode_and_first_block() {
    let registry = catalog();
    let state = InteractionState::new(&registry);

    assert_eq!(state.mode(), BuildMode::Destroy);
    assert_eq!(state.selected(), BlockId(0));
}

#[test]
fn cycling_forward_through_the_whole_catalog_returns_to_start() {
    let registry = catalog();
    let mut state = InteractionState::new(&registry);

    for _ in 0..registry.capacity() {
        state.cycle_selection(&registry, 1);
    }
    assert_eq!(state.selected(), BlockId(0));
}

#[test]
fn cycling_backward_from_zero_wraps_to_last() {
    let registry = catalog();
    let mut state = InteractionState::new(&registry);

    state.cycle_selection(&registry, -1);
    assert_eq!(state.selected(), BlockId(2));
}

#[test]
fn toggle_flips_between_build_and_destroy() {
    let registry = catalog();
    let mut state = InteractionState::new(&registry);

    state.toggle_mode();
    assert_eq!(state.mode(), BuildMode::Build);
    state.toggle_mode();
    assert_eq!(state.mode(), BuildMode::Destroy);
}

#[test]
fn out_of_range_cursor_suppresses_all_actions() {
    let registry = catalog();
    let grid = TileGrid::new();
    let mut state = build_state(&registry);

    let far = Cell::new(40, 0);
    let input = TickInput {
        primary: true,
        secondary: true,
        ..tick_at(far)
    };
    let outcome = state.tick(&registry, &grid, &NoBodies, &input);

    assert_eq!(outcome.preview, CursorPreview::OutOfRange);
    assert!(outcome.request.is_none());
    assert!(!state.within_reach());
    assert_eq!(outcome.cursor, far);
}

#[test]
fn preview_ladder_tracks_layer_occupancy() {
    let registry = catalog();
    let grid = TileGrid::new();
    let mut state = build_state(&registry);
    let cell = Cell::new(1, 0);

    // Both layers free: clear.
    let outcome = state.tick(&registry, &grid, &NoBodies, &tick_at(cell));
    assert_eq!(outcome.preview, CursorPreview::Clear);

    // Background occupied, foreground free: background-blocked.
    grid.try_place(&registry, Layer::Background, cell, BlockId(1)).unwrap();
    let outcome = state.tick(&registry, &grid, &NoBodies, &tick_at(cell));
    assert_eq!(outcome.preview, CursorPreview::BackgroundBlocked);

    // Foreground occupied: foreground-blocked wins.
    grid.try_place(&registry, Layer::Foreground, cell, BlockId(1)).unwrap();
    let outcome = state.tick(&registry, &grid, &NoBodies, &tick_at(cell));
    assert_eq!(outcome.preview, CursorPreview::ForegroundBlocked);
}

#[test]
fn dynamic_body_blocks_the_foreground_only() {
    let registry = catalog();
    let grid = TileGrid::new();
    let mut state = build_state(&registry);
    let cell = Cell::new(0, 1);

    let body_in_the_way = move |at: Cell| at == cell;
    let input = TickInput {
        primary: true,
        ..tick_at(cell)
    };
    let outcome = state.tick(&registry, &grid, &body_in_the_way, &input);

    // The probe vetoes the foreground placement even though the grid cell
    // is empty on both layers.
    assert_eq!(outcome.preview, CursorPreview::ForegroundBlocked);
    assert!(outcome.request.is_none());
}

#[test]
fn build_primary_places_on_the_foreground() {
    let registry = catalog();
    let grid = TileGrid::new();
    let mut state = build_state(&registry);
    let cell = Cell::new(2, 1);

    let input = TickInput {
        primary: true,
        ..tick_at(cell)
    };
    let outcome = state.tick(&registry, &grid, &NoBodies, &input);

    assert_eq!(
        outcome.request,
        Some(MutationRequest::Place {
            block: BlockId(0),
            layer: Layer::Foreground,
            cell,
        }),
    );
    // Placement surfaces the block's one-shot sound for the audio sink.
    assert_eq!(outcome.place_sound, Some(AssetHandle("sounds/thud")));
}

#[test]
fn build_secondary_places_on_the_background() {
    let registry = catalog();
    let grid = TileGrid::new();
    let mut state = build_state(&registry);
    let cell = Cell::new(-1, 2);

    // Foreground occupied; only the background action is available.
    grid.try_place(&registry, Layer::Foreground, cell, BlockId(1)).unwrap();
    let input = TickInput {
        primary: true,
        secondary: true,
        ..tick_at(cell)
    };
    let outcome = state.tick(&registry, &grid, &NoBodies, &input);

    assert_eq!(
        outcome.request,
        Some(MutationRequest::Place {
            block: BlockId(0),
            layer: Layer::Background,
            cell,
        }),
    );
}

#[test]
fn scroll_cycles_selection_before_placing() {
    let registry = catalog();
    let grid = TileGrid::new();
    let mut state = build_state(&registry);
    let cell = Cell::new(0, 2);

    let input = TickInput {
        cycle: 1,
        primary: true,
        ..tick_at(cell)
    };
    let outcome = state.tick(&registry, &grid, &NoBodies, &input);

    assert_eq!(state.selected(), BlockId(1));
    assert_eq!(
        outcome.request,
        Some(MutationRequest::Place {
            block: BlockId(1),
            layer: Layer::Foreground,
            cell,
        }),
    );
}

#[test]
fn destroy_mode_breaks_without_occupancy_precheck() {
    let registry = catalog();
    let grid = TileGrid::new();
    let mut state = InteractionState::new(&registry);
    state.set_anchor(Cell::new(0, 0).center());
    let cell = Cell::new(1, 1);

    // Primary targets the foreground; the cell being empty is the
    // authority's problem, not the requester's.
    let input = TickInput {
        primary: true,
        ..tick_at(cell)
    };
    let outcome = state.tick(&registry, &grid, &NoBodies, &input);
    assert_eq!(
        outcome.request,
        Some(MutationRequest::Break {
            layer: Layer::Foreground,
            cell,
        }),
    );
    assert!(outcome.place_sound.is_none());

    // Secondary targets the background.
    let input = TickInput {
        secondary: true,
        ..tick_at(cell)
    };
    let outcome = state.tick(&registry, &grid, &NoBodies, &input);
    assert_eq!(
        outcome.request,
        Some(MutationRequest::Break {
            layer: Layer::Background,
            cell,
        }),
    );
}

#[test]
fn cursor_sprite_follows_mode_and_selection() {
    let registry = catalog();
    let grid = TileGrid::new();
    let mut state = InteractionState::new(&registry);
    state.set_anchor(WorldPos::new(0.5, 0.5));

    // Destroy mode: no block sprite, the renderer shows its destroy icon.
    let outcome = state.tick(&registry, &grid, &NoBodies, &tick_at(Cell::new(0, 1)));
    assert!(outcome.cursor_sprite.is_none());

    // Build mode: the selected block's sprite.
    let input = TickInput {
        toggle_mode: true,
        ..tick_at(Cell::new(0, 1))
    };
    let outcome = state.tick(&registry, &grid, &NoBodies, &input);
    assert_eq!(outcome.cursor_sprite, Some(AssetHandle("blocks/dirt")));
}

#[test]
fn cycling_skips_holes_left_by_dropped_definitions() {
    fn pinned_two() -> BlockSpec {
        BlockSpec {
            declared_id: Some(2),
            name: "Pinned",
            sprite: AssetHandle("blocks/pinned"),
            place_sound: None,
        }
    }
    fn dup_of_two() -> BlockSpec {
        BlockSpec {
            declared_id: Some(2),
            name: "DroppedDup",
            sprite: AssetHandle("blocks/dup"),
            place_sound: None,
        }
    }
    // Populated ids: 0 (dirt), 2 (pinned); slot 1 stays a hole.
    let registry = BlockRegistry::build(&[pinned_two, dup_of_two, dirt]);
    let mut state = InteractionState::new(&registry);
    assert_eq!(state.selected(), BlockId(0));

    state.cycle_selection(&registry, 1);
    assert_eq!(state.selected(), BlockId(2));
    state.cycle_selection(&registry, 1);
    assert_eq!(state.selected(), BlockId(0));
    state.cycle_selection(&registry, -1);
    assert_eq!(state.selected(), BlockId(2));
}
