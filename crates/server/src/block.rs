//! The built-in block catalog.
//!
//! Every placeable block type lives here as one factory function in
//! [`FACTORIES`]; the registry is built from that slice at startup. The id
//! constants match registration order (all entries use the unassigned
//! sentinel, so ids are assigned densely in list order) and exist so world
//! generation and tests can name blocks without a registry lookup.

use blockgrid_engine::registry::{AssetHandle, BlockFactory, BlockId, BlockSpec};

pub const DIRT: BlockId = BlockId(0);
pub const GRASS: BlockId = BlockId(1);
pub const STONE: BlockId = BlockId(2);
pub const SAND: BlockId = BlockId(3);
pub const LOG: BlockId = BlockId(4);
pub const LEAVES: BlockId = BlockId(5);
pub const BRICK: BlockId = BlockId(6);
pub const GLASS: BlockId = BlockId(7);

/// Registration order defines the id space. Append new block types at the
/// end; reordering existing entries renumbers every world that refers to
/// them by id.
pub const FACTORIES: &[BlockFactory] = &[
    dirt, grass, stone, sand, log, leaves, brick, glass,
];

const THUD: AssetHandle = AssetHandle("sounds/place_thud");
const TAP: AssetHandle = AssetHandle("sounds/place_tap");

fn dirt() -> BlockSpec {
    BlockSpec {
        declared_id: None,
        name: "Dirt",
        sprite: AssetHandle("blocks/dirt"),
        place_sound: Some(THUD),
    }
}

fn grass() -> BlockSpec {
    BlockSpec {
        declared_id: None,
        name: "Grass",
        sprite: AssetHandle("blocks/grass"),
        place_sound: Some(THUD),
    }
}

fn stone() -> BlockSpec {
    BlockSpec {
        declared_id: None,
        name: "Stone",
        sprite: AssetHandle("blocks/stone"),
        place_sound: Some(TAP),
    }
}

fn sand() -> BlockSpec {
    BlockSpec {
        declared_id: None,
        name: "Sand",
        sprite: AssetHandle("blocks/sand"),
        place_sound: Some(THUD),
    }
}

fn log() -> BlockSpec {
    BlockSpec {
        declared_id: None,
        name: "Log",
        sprite: AssetHandle("blocks/log"),
        place_sound: Some(THUD),
    }
}

fn leaves() -> BlockSpec {
    BlockSpec {
        declared_id: None,
        name: "Leaves",
        sprite: AssetHandle("blocks/leaves"),
        // Leaves place silently.
        place_sound: None,
    }
}

fn brick() -> BlockSpec {
    BlockSpec {
        declared_id: None,
        name: "Brick",
        sprite: AssetHandle("blocks/brick"),
        place_sound: Some(TAP),
    }
}

fn glass() -> BlockSpec {
    BlockSpec {
        declared_id: None,
        name: "Glass",
        sprite: AssetHandle("blocks/glass"),
        place_sound: Some(TAP),
    }
}
