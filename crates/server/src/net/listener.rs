use std::sync::Arc;

use blockgrid_engine::grid::TileGrid;
use blockgrid_engine::registry::BlockRegistry;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};

use crate::authority::MutationCommand;
use crate::event_bus::GridChangeBatch;
use crate::participant_registry::ParticipantRegistry;

/// Start the TCP listener and accept participant connections.
pub async fn run(
    grid: Arc<TileGrid>,
    registry: Arc<BlockRegistry>,
    participants: Arc<ParticipantRegistry>,
    authority_tx: mpsc::Sender<MutationCommand>,
    bus_tx: broadcast::Sender<GridChangeBatch>,
    bind_addr: &str,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("Listening on {}", bind_addr);

    loop {
        let (stream, addr) = listener.accept().await?;
        tracing::info!("Connection from {}", addr);

        let grid = Arc::clone(&grid);
        let registry = Arc::clone(&registry);
        let participants = Arc::clone(&participants);
        let authority_tx = authority_tx.clone();
        let bus_tx = bus_tx.clone();
        tokio::spawn(async move {
            let result =
                super::connection::handle(stream, grid, registry, participants, authority_tx, bus_tx)
                    .await;
            if let Err(e) = result {
                tracing::warn!("Connection from {} closed: {}", addr, e);
            }
        });
    }
}
