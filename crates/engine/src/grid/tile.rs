use serde::{Deserialize, Serialize};

use crate::registry::{AssetHandle, BlockDefinition, BlockId};

/// The two independent planes every cell may occupy.
///
/// Foreground occupants take part in solid-body collision; background
/// occupants are purely decorative and never block movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Foreground,
    Background,
}

impl Layer {
    pub const ALL: [Layer; 2] = [Layer::Foreground, Layer::Background];
}

/// RGBA render tint applied to a placed tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tint {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Tint {
    /// No tint (full white, fully opaque).
    pub const NONE: Tint = Tint { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    /// The fixed background dimming: 50% luminance, fully opaque.
    pub const BACKDROP: Tint = Tint { r: 0.5, g: 0.5, b: 0.5, a: 1.0 };
}

/// One occupied cell. Absence of a record means the cell is empty -- there
/// is no null/sentinel record.
///
/// Everything here is derived from the block definition and the layer at
/// placement time, so renderers never need a registry round trip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRecord {
    pub block: BlockId,
    pub sprite: AssetHandle,
    pub collidable: bool,
    pub tint: Tint,
}

impl TileRecord {
    pub fn derive(def: &BlockDefinition, layer: Layer) -> Self {
        Self {
            block: def.id,
            sprite: def.sprite,
            collidable: layer == Layer::Foreground,
            tint: match layer {
                Layer::Foreground => Tint::NONE,
                Layer::Background => Tint::BACKDROP,
            },
        }
    }
}
