//! Per-client connection handler.
//!
//! Hello -> Welcome (catalog + grid snapshot) -> request/delta pump.
//!
//! The pump forwards every committed [`GridChangeBatch`] to the client,
//! including batches the client itself caused -- replication is the only
//! way a requester learns a mutation's outcome. Inbound requests are
//! relayed to the authority queue untouched; all validation happens there.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use blockgrid_engine::grid::{CELL_SIZE, TileGrid, WorldPos};
use blockgrid_engine::interact::MutationRequest;
use blockgrid_engine::registry::BlockRegistry;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedReadHalf;
use tokio::sync::{broadcast, mpsc};

use crate::authority::MutationCommand;
use crate::event_bus::GridChangeBatch;
use crate::participant_registry::{ParticipantEvent, ParticipantInfo, ParticipantRegistry};
use crate::protocol::{self, CellState, ClientMessage, ServerMessage};

/// Handle a single participant connection for its whole lifetime.
pub async fn handle(
    stream: TcpStream,
    grid: Arc<TileGrid>,
    registry: Arc<BlockRegistry>,
    participants: Arc<ParticipantRegistry>,
    authority_tx: mpsc::Sender<MutationCommand>,
    bus_tx: broadcast::Sender<GridChangeBatch>,
) -> Result<()> {
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    // ── Handshake: the first line must be Hello ─────────────────────────
    let first = lines
        .next_line()
        .await?
        .ok_or_else(|| anyhow!("connection closed before hello"))?;
    let name = match serde_json::from_str::<ClientMessage>(&first).context("malformed hello")? {
        ClientMessage::Hello { name } => name,
        other => return Err(anyhow!("expected hello, got {:?}", other)),
    };

    let conn_id = participants.allocate_conn_id();
    tracing::info!("Participant '{}' joined (conn {})", name, conn_id);

    // Subscribe before snapshotting so no delta can fall into the gap
    // between the welcome state and the first forwarded batch.
    let bus_rx = bus_tx.subscribe();
    let presence_rx = participants.subscribe();

    send(&mut write, &welcome(conn_id, &registry, &grid)).await?;

    // Tell the newcomer who is already here, then register -- this
    // ordering (plus subscribing first) means the connection never relays
    // its own join event.
    for info in participants.snapshot() {
        send(&mut write, &ServerMessage::Joined { conn_id: info.conn_id, name: info.name }).await?;
    }
    participants.register(ParticipantInfo {
        conn_id,
        name,
        anchor: WorldPos::default(),
    });
    tracing::debug!("{} participants online", participants.count());

    let result = pump(
        conn_id,
        &mut lines,
        &mut write,
        &grid,
        &registry,
        &participants,
        &authority_tx,
        bus_rx,
        presence_rx,
    )
    .await;

    participants.deregister(conn_id);
    tracing::info!("Participant left (conn {})", conn_id);
    result
}

#[allow(clippy::too_many_arguments)]
async fn pump<W>(
    conn_id: u64,
    lines: &mut Lines<BufReader<OwnedReadHalf>>,
    write: &mut W,
    grid: &TileGrid,
    registry: &BlockRegistry,
    participants: &ParticipantRegistry,
    authority_tx: &mpsc::Sender<MutationCommand>,
    mut bus_rx: broadcast::Receiver<GridChangeBatch>,
    mut presence_rx: broadcast::Receiver<ParticipantEvent>,
) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    loop {
        tokio::select! {
            batch = bus_rx.recv() => match batch {
                Ok(batch) => {
                    let changes = batch.changes.iter().copied().map(CellState::from).collect();
                    send(write, &ServerMessage::GridDelta { changes }).await?;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Missed deltas can't be replayed; resync from scratch.
                    tracing::warn!("Conn {} lagged {} batches, resyncing", conn_id, skipped);
                    send(write, &welcome(conn_id, registry, grid)).await?;
                }
                Err(broadcast::error::RecvError::Closed) => return Ok(()),
            },

            event = presence_rx.recv() => match event {
                Ok(ParticipantEvent::Joined { conn_id: other, name }) if other != conn_id => {
                    send(write, &ServerMessage::Joined { conn_id: other, name }).await?;
                }
                Ok(ParticipantEvent::Left { conn_id: other }) if other != conn_id => {
                    send(write, &ServerMessage::Left { conn_id: other }).await?;
                }
                Ok(_) => {}
                // Presence is low-rate and self-correcting; dropped events
                // only cost a stale roster entry.
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => return Ok(()),
            },

            line = lines.next_line() => {
                let Some(line) = line? else { return Ok(()) };
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<ClientMessage>(&line) {
                    Ok(message) => {
                        handle_message(conn_id, message, participants, authority_tx).await?;
                    }
                    Err(err) => {
                        tracing::warn!("Dropping malformed message from conn {}: {}", conn_id, err);
                    }
                }
            }
        }
    }
}

async fn handle_message(
    conn_id: u64,
    message: ClientMessage,
    participants: &ParticipantRegistry,
    authority_tx: &mpsc::Sender<MutationCommand>,
) -> Result<()> {
    let request = match message {
        ClientMessage::Hello { .. } => {
            tracing::warn!("Conn {} sent a second hello, ignoring", conn_id);
            return Ok(());
        }
        ClientMessage::Move { x, y } => {
            participants.update_anchor(conn_id, WorldPos::new(x, y));
            return Ok(());
        }
        ClientMessage::Place { block, layer, cell } => {
            MutationRequest::Place { block, layer, cell }
        }
        ClientMessage::Break { layer, cell } => MutationRequest::Break { layer, cell },
    };

    authority_tx
        .send(MutationCommand { conn_id, request })
        .await
        .map_err(|_| anyhow!("authority queue closed"))
}

fn welcome(conn_id: u64, registry: &BlockRegistry, grid: &TileGrid) -> ServerMessage {
    let cells = grid
        .snapshot()
        .into_iter()
        .map(|(layer, cell, block)| CellState {
            layer,
            cell,
            block: Some(block),
        })
        .collect();
    ServerMessage::Welcome {
        conn_id,
        cell_size: CELL_SIZE,
        catalog: protocol::catalog_entries(registry),
        grid: cells,
    }
}

async fn send<W>(write: &mut W, message: &ServerMessage) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut bytes = serde_json::to_vec(message)?;
    bytes.push(b'\n');
    write.write_all(&bytes).await?;
    Ok(())
}
