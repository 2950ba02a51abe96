//! Wire protocol: newline-delimited JSON, one message per line.
//!
//! Requests ride an external reliable-ordered channel (here: one TCP
//! connection per participant); replication is the server rebroadcasting
//! committed deltas to every connection. Mutation failures produce no
//! message at all -- at-most-once, no retry.

use blockgrid_engine::grid::{Cell, Layer};
use blockgrid_engine::registry::{BlockId, BlockRegistry};
use serde::{Deserialize, Serialize};

use crate::event_bus::GridChange;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Must be the first message on a connection.
    Hello { name: String },
    /// Anchor update; feeds the authority's reach gate.
    Move { x: f32, y: f32 },
    /// Place `block` at `cell` on `layer`. The requester has already
    /// converted its pointer position to cell coordinates.
    Place { block: BlockId, layer: Layer, cell: Cell },
    /// Clear `cell` on `layer`.
    Break { layer: Layer, cell: Cell },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once after a valid `Hello`: the catalog for the client's
    /// selection UI plus a full grid snapshot to sync from.
    Welcome {
        conn_id: u64,
        cell_size: f32,
        catalog: Vec<CatalogEntry>,
        grid: Vec<CellState>,
    },
    /// Committed grid changes, broadcast to every connection.
    GridDelta { changes: Vec<CellState> },
    Joined { conn_id: u64, name: String },
    Left { conn_id: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: BlockId,
    pub name: String,
}

/// One cell's occupancy. `block: None` means empty/cleared.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellState {
    pub layer: Layer,
    pub cell: Cell,
    pub block: Option<BlockId>,
}

impl From<GridChange> for CellState {
    fn from(change: GridChange) -> Self {
        Self {
            layer: change.layer,
            cell: change.cell,
            block: change.block,
        }
    }
}

pub fn catalog_entries(registry: &BlockRegistry) -> Vec<CatalogEntry> {
    registry
        .enumerate()
        .map(|(id, name)| CatalogEntry {
            id,
            name: name.to_string(),
        })
        .collect()
}
