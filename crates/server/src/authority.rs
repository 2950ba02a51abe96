//! The authority role: the single owner of the canonical grid write path.
//!
//! All mutation requests funnel through one bounded mpsc queue into one
//! task, which processes them strictly in receipt order -- two racing
//! placements on the same cell resolve first-committed-wins, and the loser
//! becomes a silent no-op. There is no acknowledgment back to the
//! requester and no retry: the outcome becomes observable to everyone
//! (including the requester) through the grid-change bus.

use std::sync::Arc;

use blockgrid_engine::grid::{PlaceError, RemoveError, TileGrid};
use blockgrid_engine::interact::{MAX_BUILD_DISTANCE, MutationRequest};
use blockgrid_engine::registry::BlockRegistry;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

use crate::event_bus::{GridChange, GridChangeBatch};
use crate::participant_registry::ParticipantRegistry;

/// Queue depth for pending mutation commands. Senders back-pressure once
/// this many requests are in flight.
pub const QUEUE_CAPACITY: usize = 256;

/// One participant intent, tagged with the connection that issued it.
#[derive(Debug, Clone, Copy)]
pub struct MutationCommand {
    pub conn_id: u64,
    pub request: MutationRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error(transparent)]
    Place(#[from] PlaceError),
    #[error(transparent)]
    Remove(#[from] RemoveError),
}

/// Apply one request to the grid, returning the resulting cell transition.
///
/// This is the whole mutation protocol's apply step; the queue task, the
/// demo, and the tests all go through it.
pub fn apply(
    grid: &TileGrid,
    registry: &BlockRegistry,
    request: &MutationRequest,
) -> Result<GridChange, MutationError> {
    match *request {
        MutationRequest::Place { block, layer, cell } => {
            let record = grid.try_place(registry, layer, cell, block)?;
            Ok(GridChange {
                layer,
                cell,
                block: Some(record.block),
            })
        }
        MutationRequest::Break { layer, cell } => {
            grid.try_remove(layer, cell)?;
            Ok(GridChange {
                layer,
                cell,
                block: None,
            })
        }
    }
}

/// Validate and apply one command, publishing the change on success.
///
/// The reach gate lives here, not only in the requester's preview: a
/// request targeting a cell farther than [`MAX_BUILD_DISTANCE`] from the
/// participant's last known anchor is rejected outright.
pub fn process_command(
    grid: &TileGrid,
    registry: &BlockRegistry,
    participants: &ParticipantRegistry,
    bus: &broadcast::Sender<GridChangeBatch>,
    command: MutationCommand,
) {
    let MutationCommand { conn_id, request } = command;

    let Some(anchor) = participants.anchor(conn_id) else {
        tracing::warn!("Mutation from unknown participant {} dropped", conn_id);
        return;
    };
    if anchor.distance(request.cell().center()) > MAX_BUILD_DISTANCE {
        tracing::debug!(
            "Mutation from {} rejected: {:?} cell {:?} out of reach",
            conn_id,
            request.layer(),
            request.cell(),
        );
        return;
    }

    match apply(grid, registry, &request) {
        Ok(change) => {
            // Ignore send errors (no subscribers = no problem).
            let _ = bus.send(GridChangeBatch::single(conn_id, change));
        }
        Err(err) => {
            // Silent toward the requester; it observes the unchanged grid
            // through replication.
            tracing::debug!("Mutation from {} not applied: {}", conn_id, err);
        }
    }
}

/// Spawn the authority task and hand back the request queue's sender.
pub fn start(
    grid: Arc<TileGrid>,
    registry: Arc<BlockRegistry>,
    participants: Arc<ParticipantRegistry>,
    bus: broadcast::Sender<GridChangeBatch>,
) -> mpsc::Sender<MutationCommand> {
    let (tx, mut rx) = mpsc::channel::<MutationCommand>(QUEUE_CAPACITY);
    tokio::spawn(async move {
        while let Some(command) = rx.recv().await {
            process_command(&grid, &registry, &participants, &bus, command);
        }
        tracing::info!("Authority queue closed");
    });
    tx
}
