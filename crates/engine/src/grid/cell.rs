use serde::{Deserialize, Serialize};

/// Side length of one grid cell in world units. Requesters and the
/// authority must agree on this exactly, or their cell coordinates drift.
pub const CELL_SIZE: f32 = 1.0;

/// A point in continuous world space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl WorldPos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: WorldPos) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Integer-addressed position in the infinite sparse grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i64,
    pub y: i64,
}

impl Cell {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// The cell containing a world-space point (floor division by the
    /// fixed cell size, so negative coordinates round toward -inf).
    pub fn from_world(pos: WorldPos) -> Self {
        Self {
            x: (pos.x / CELL_SIZE).floor() as i64,
            y: (pos.y / CELL_SIZE).floor() as i64,
        }
    }

    /// World-space midpoint of this cell. Reach checks measure to here.
    pub fn center(self) -> WorldPos {
        WorldPos {
            x: (self.x as f32 + 0.5) * CELL_SIZE,
            y: (self.y as f32 + 0.5) * CELL_SIZE,
        }
    }
}
