//! One-shot world generation.
//!
//! Runs once during startup, before the mutation protocol accepts
//! requests: a flat grass/dirt/stone terrain on the foreground with a
//! stone backdrop on the background. Everything after this point mutates
//! the grid exclusively through the authority.

use anyhow::{Context, Result};
use blockgrid_engine::grid::{Cell, Layer, PlaceError, TileGrid};
use blockgrid_engine::registry::{BlockId, BlockRegistry};

use crate::block;

/// Surface row: grass here, dirt and stone below, open air above.
pub const SURFACE_Y: i64 = 0;
/// Lowest generated row.
pub const FLOOR_Y: i64 = -8;

/// Populate the grid with the starting terrain, columns `-radius..=radius`.
/// Returns the number of cells placed.
pub fn generate_main_map(grid: &TileGrid, registry: &BlockRegistry, radius: i64) -> Result<usize> {
    let mut placed = 0;

    for x in -radius..=radius {
        fill(grid, registry, Layer::Foreground, Cell::new(x, SURFACE_Y), block::GRASS, &mut placed)?;
        for y in (SURFACE_Y - 3)..SURFACE_Y {
            fill(grid, registry, Layer::Foreground, Cell::new(x, y), block::DIRT, &mut placed)?;
        }
        for y in FLOOR_Y..(SURFACE_Y - 3) {
            fill(grid, registry, Layer::Foreground, Cell::new(x, y), block::STONE, &mut placed)?;
        }
        // Backdrop behind the whole column, so broken-out caves show stone
        // instead of the void.
        for y in FLOOR_Y..=SURFACE_Y {
            fill(grid, registry, Layer::Background, Cell::new(x, y), block::STONE, &mut placed)?;
        }
    }

    Ok(placed)
}

fn fill(
    grid: &TileGrid,
    registry: &BlockRegistry,
    layer: Layer,
    cell: Cell,
    id: BlockId,
    placed: &mut usize,
) -> Result<()> {
    match grid.try_place(registry, layer, cell, id) {
        Ok(_) => {
            *placed += 1;
            Ok(())
        }
        // Generation never overwrites pre-existing cells.
        Err(PlaceError::AlreadyOccupied(..)) => Ok(()),
        Err(err @ PlaceError::InvalidBlockId(_)) => {
            Err(err).context("block catalog out of sync with world generation")
        }
    }
}
