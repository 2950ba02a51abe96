use std::sync::Arc;

use blockgrid_engine::grid::TileGrid;
use blockgrid_engine::registry::BlockRegistry;
use blockgrid_server::event_bus::GridChangeBatch;
use blockgrid_server::participant_registry::ParticipantRegistry;
use blockgrid_server::{authority, block, event_bus, net, worldgen};
use tokio::sync::broadcast;

#[tokio::main]
async fn main() {
    let demo_mode = std::env::args().any(|a| a == "--demo");
    let bind_addr = std::env::args()
        .skip_while(|a| a != "--bind")
        .nth(1)
        .unwrap_or_else(|| "0.0.0.0:4777".into());
    let terrain_radius: i64 = std::env::args()
        .skip_while(|a| a != "--terrain-radius")
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(64);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".parse().unwrap()),
        )
        .init();

    tracing::info!("Blockgrid -- collaborative build server");

    // ── Catalog first, then the world it describes ──────────────────────
    let registry = Arc::new(BlockRegistry::build(block::FACTORIES));
    tracing::info!("Block catalog ready: {} types", registry.len());

    let grid = Arc::new(TileGrid::new());
    match worldgen::generate_main_map(&grid, &registry, terrain_radius) {
        Ok(placed) => tracing::info!("World generated: {} cells", placed),
        Err(e) => {
            tracing::error!("World generation failed: {:#}", e);
            return;
        }
    }

    if demo_mode {
        run_demo(&grid, &registry);
        return;
    }

    // Grid-change bus: the authority publishes committed mutations here,
    // all connections subscribe to replicate them.
    let (bus_tx, _) = broadcast::channel::<GridChangeBatch>(event_bus::BUS_CAPACITY);

    let participants = Arc::new(ParticipantRegistry::new());

    let authority_tx = authority::start(
        Arc::clone(&grid),
        Arc::clone(&registry),
        Arc::clone(&participants),
        bus_tx.clone(),
    );

    // ── Start listener with graceful shutdown ───────────────────────────
    tokio::select! {
        result = net::listener::run(
            grid, registry, participants, authority_tx, bus_tx, &bind_addr,
        ) => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received, shutting down...");
        }
    }
}

/// Offline demo: drive a scripted participant through the interaction
/// state machine against a local apply loop, no networking involved.
fn run_demo(grid: &TileGrid, registry: &BlockRegistry) {
    use blockgrid_engine::grid::{Cell, Layer, WorldPos};
    use blockgrid_engine::interact::{InteractionState, NoBodies, TickInput};

    tracing::info!("Demo: scripted participant builds a brick column, then breaks one");

    let mut state = InteractionState::new(registry);
    state.set_anchor(WorldPos::new(0.5, 1.5));

    // Toggle into build mode and scroll until brick is selected.
    let mut input = TickInput {
        toggle_mode: true,
        ..TickInput::default()
    };
    state.tick(registry, grid, &NoBodies, &input);
    while state.selected() != block::BRICK {
        input = TickInput {
            cycle: 1,
            pointer: WorldPos::new(0.5, 1.5),
            ..TickInput::default()
        };
        state.tick(registry, grid, &NoBodies, &input);
    }
    tracing::info!("Selected block id {:?}", state.selected());

    // Place three bricks above the surface.
    for y in 1..=3 {
        input = TickInput {
            pointer: WorldPos::new(0.5, y as f32 + 0.5),
            primary: true,
            ..TickInput::default()
        };
        let outcome = state.tick(registry, grid, &NoBodies, &input);
        if let Some(request) = outcome.request {
            match authority::apply(grid, registry, &request) {
                Ok(change) => tracing::info!("Applied {:?}", change),
                Err(err) => tracing::warn!("Rejected: {}", err),
            }
        }
        if let Some(sound) = outcome.place_sound {
            tracing::info!("(audio sink) play {:?}", sound);
        }
    }

    // Toggle to destroy mode and break the middle brick.
    input = TickInput {
        pointer: WorldPos::new(0.5, 2.5),
        toggle_mode: true,
        primary: true,
        ..TickInput::default()
    };
    let outcome = state.tick(registry, grid, &NoBodies, &input);
    if let Some(request) = outcome.request {
        match authority::apply(grid, registry, &request) {
            Ok(change) => tracing::info!("Applied {:?}", change),
            Err(err) => tracing::warn!("Rejected: {}", err),
        }
    }

    let column: Vec<bool> = (1..=3)
        .map(|y| {
            grid.query(Layer::Foreground, Cell::new(0, y)).is_some()
        })
        .collect();
    tracing::info!("Column occupancy y=1..=3: {:?}", column);
}
