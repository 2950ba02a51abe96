//! Wire-format stability: clients in other languages parse these exact
//! shapes, so the JSON layout is part of the protocol contract.

use blockgrid_engine::grid::{Cell, Layer};
use blockgrid_engine::registry::BlockId;
use blockgrid_server::protocol::{CellState, ClientMessage, ServerMessage};

#[test]
fn place_request_wire_shape() {
    let message = ClientMessage::Place {
        block: BlockId(6),
        layer: Layer::Foreground,
        cell: Cell::new(3, -4),
    };

    let json = serde_json::to_string(&message).unwrap();
    assert_eq!(
        json,
        r#"{"type":"place","block":6,"layer":"foreground","cell":{"x":3,"y":-4}}"#,
    );

    let parsed: ClientMessage = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, message);
}

#[test]
fn grid_delta_wire_shape() {
    let message = ServerMessage::GridDelta {
        changes: vec![CellState {
            layer: Layer::Background,
            cell: Cell::new(0, 2),
            block: None,
        }],
    };

    let json = serde_json::to_string(&message).unwrap();
    assert_eq!(
        json,
        r#"{"type":"grid_delta","changes":[{"layer":"background","cell":{"x":0,"y":2},"block":null}]}"#,
    );
}
