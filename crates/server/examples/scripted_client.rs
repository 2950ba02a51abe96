//! Scripted wire-protocol client: joins a running server, walks next to
//! the origin, places three bricks, breaks the middle one, and prints
//! everything the server sends.
//!
//! Start a server first:
//!   cargo run -p blockgrid-server -- --bind 127.0.0.1:4777
//! then:
//!   cargo run -p blockgrid-server --example scripted_client -- 127.0.0.1:4777

use std::time::Duration;

use blockgrid_engine::grid::{Cell, Layer};
use blockgrid_engine::registry::BlockId;
use blockgrid_server::protocol::{ClientMessage, ServerMessage};
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

async fn send<W: AsyncWrite + Unpin>(write: &mut W, message: &ClientMessage) -> anyhow::Result<()> {
    let mut bytes = serde_json::to_vec(message)?;
    bytes.push(b'\n');
    write.write_all(&bytes).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let addr = std::env::args().nth(1).unwrap_or_else(|| "127.0.0.1:4777".into());

    let stream = TcpStream::connect(&addr).await?;
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    // Print server messages as they arrive.
    let reader = tokio::spawn(async move {
        while let Ok(Some(line)) = lines.next_line().await {
            match serde_json::from_str::<ServerMessage>(&line) {
                Ok(ServerMessage::Welcome { conn_id, catalog, grid, .. }) => {
                    println!("<- welcome: conn {}, {} block types, {} cells", conn_id, catalog.len(), grid.len());
                    for entry in &catalog {
                        println!("   catalog {:?}: {}", entry.id, entry.name);
                    }
                }
                Ok(ServerMessage::GridDelta { changes }) => {
                    for c in changes {
                        println!("<- delta: {:?} {:?} -> {:?}", c.layer, c.cell, c.block);
                    }
                }
                Ok(other) => println!("<- {:?}", other),
                Err(err) => println!("<- unparseable line: {}", err),
            }
        }
    });

    send(&mut write, &ClientMessage::Hello { name: "scripted".into() }).await?;
    send(&mut write, &ClientMessage::Move { x: 0.5, y: 1.5 }).await?;

    // Brick is id 6 in the built-in catalog.
    let brick = BlockId(6);
    for y in 1..=3 {
        send(&mut write, &ClientMessage::Place {
            block: brick,
            layer: Layer::Foreground,
            cell: Cell::new(0, y),
        })
        .await?;
    }
    send(&mut write, &ClientMessage::Break { layer: Layer::Foreground, cell: Cell::new(0, 2) }).await?;

    // Give the deltas a moment to come back before hanging up.
    tokio::time::sleep(Duration::from_millis(500)).await;
    reader.abort();
    Ok(())
}
