//! Grid-change event bus for cross-participant distribution.
//!
//! Every mutation the authority commits is published as a
//! [`GridChangeBatch`] on a shared `tokio::sync::broadcast` channel. Each
//! connection subscribes and forwards batches to its client -- including
//! the originator's own: there is no separate acknowledgment path, so the
//! requester learns the outcome the same way everyone else does.

use std::sync::Arc;

use blockgrid_engine::grid::{Cell, Layer};
use blockgrid_engine::registry::BlockId;

/// Recommended capacity for the broadcast channel.
/// 256 batches in flight should handle bursty activity without lagging.
pub const BUS_CAPACITY: usize = 256;

/// One cell transition. `block: None` means the cell was cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridChange {
    pub layer: Layer,
    pub cell: Cell,
    pub block: Option<BlockId>,
}

/// A batch of grid changes from one committed mutation.
///
/// Uses `Arc<[...]>` so cloning per broadcast subscriber is just a
/// refcount bump.
#[derive(Debug, Clone)]
pub struct GridChangeBatch {
    /// Connection id of the participant whose request caused the batch.
    pub source: u64,
    pub changes: Arc<[GridChange]>,
}

impl GridChangeBatch {
    pub fn single(source: u64, change: GridChange) -> Self {
        Self {
            source,
            changes: Arc::from([change]),
        }
    }
}
