pub mod cell;
pub mod tile;

pub use cell::{Cell, WorldPos, CELL_SIZE};
pub use tile::{Layer, TileRecord, Tint};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use thiserror::Error;

use crate::registry::{BlockId, BlockRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlaceError {
    #[error("block id {0} is not registered")]
    InvalidBlockId(BlockId),
    #[error("cell ({}, {}) already occupied on the {:?} layer", .0.x, .0.y, .1)]
    AlreadyOccupied(Cell, Layer),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RemoveError {
    #[error("cell ({}, {}) already empty on the {:?} layer", .0.x, .0.y, .1)]
    AlreadyEmpty(Cell, Layer),
}

/// The shared tile world: two independent sparse layers over an infinite
/// integer grid. Thread-safe, lock-sharded by cell.
///
/// All writes go through [`try_place`](TileGrid::try_place) and
/// [`try_remove`](TileGrid::try_remove); the authority funnels them
/// through one serialized queue, while readers may query concurrently.
/// Takes `&self` throughout because `DashMap` provides interior
/// mutability via per-shard locking.
pub struct TileGrid {
    foreground: DashMap<Cell, TileRecord>,
    background: DashMap<Cell, TileRecord>,
}

impl TileGrid {
    pub fn new() -> Self {
        Self {
            foreground: DashMap::new(),
            background: DashMap::new(),
        }
    }

    fn plane(&self, layer: Layer) -> &DashMap<Cell, TileRecord> {
        match layer {
            Layer::Foreground => &self.foreground,
            Layer::Background => &self.background,
        }
    }

    /// Read one cell on one layer. Pure, never fails; `None` means empty.
    pub fn query(&self, layer: Layer, cell: Cell) -> Option<TileRecord> {
        self.plane(layer).get(&cell).map(|record| *record)
    }

    /// Place a block, deriving the stored record from its definition.
    ///
    /// Placement never overwrites: an occupied slot fails with
    /// `AlreadyOccupied` and leaves the existing record untouched. The
    /// occupancy check and insert are one atomic entry operation, so two
    /// racing placements resolve first-committed-wins.
    ///
    /// The other layer is never consulted -- a cell may hold a foreground
    /// and a background occupant at the same time.
    pub fn try_place(
        &self,
        registry: &BlockRegistry,
        layer: Layer,
        cell: Cell,
        block: BlockId,
    ) -> Result<TileRecord, PlaceError> {
        let def = registry
            .lookup(block)
            .map_err(|_| PlaceError::InvalidBlockId(block))?;

        match self.plane(layer).entry(cell) {
            Entry::Occupied(_) => Err(PlaceError::AlreadyOccupied(cell, layer)),
            Entry::Vacant(slot) => {
                let record = TileRecord::derive(def, layer);
                slot.insert(record);
                Ok(record)
            }
        }
    }

    /// Clear one cell, returning the evicted record.
    ///
    /// The only precondition is occupancy -- there is no ownership or
    /// block-type check on who may remove what.
    pub fn try_remove(&self, layer: Layer, cell: Cell) -> Result<TileRecord, RemoveError> {
        self.plane(layer)
            .remove(&cell)
            .map(|(_, record)| record)
            .ok_or(RemoveError::AlreadyEmpty(cell, layer))
    }

    /// Number of occupied cells on one layer.
    pub fn occupied(&self, layer: Layer) -> usize {
        self.plane(layer).len()
    }

    /// Full-state dump, used to seed newly joined participants.
    ///
    /// Iteration order is unspecified; the result is a consistent-enough
    /// snapshot for replication (cells mutated mid-dump arrive as deltas).
    pub fn snapshot(&self) -> Vec<(Layer, Cell, BlockId)> {
        let mut cells = Vec::with_capacity(self.foreground.len() + self.background.len());
        for layer in Layer::ALL {
            for entry in self.plane(layer).iter() {
                cells.push((layer, *entry.key(), entry.value().block));
            }
        }
        cells
    }
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::new()
    }
}
