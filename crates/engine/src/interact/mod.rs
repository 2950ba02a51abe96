//! Per-participant build interaction: the client-side state machine that
//! turns local input into mutation requests.
//!
//! Each participant's session owns exactly one [`InteractionState`] and
//! drives it from its tick loop; nothing here is shared across
//! participants. The state machine reads the registry and grid but never
//! writes them -- all mutation flows through the authority as
//! [`MutationRequest`]s.

use crate::grid::{Cell, Layer, TileGrid, WorldPos};
use crate::registry::{AssetHandle, BlockId, BlockRegistry};

/// Maximum distance (world units) from a participant's anchor at which
/// placements and removals are allowed. Shared by the requester's preview
/// and the authority's gate, so the two can't disagree.
pub const MAX_BUILD_DISTANCE: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    #[default]
    Destroy,
    Build,
}

/// A participant's intent, already converted to cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationRequest {
    Place {
        block: BlockId,
        layer: Layer,
        cell: Cell,
    },
    Break {
        layer: Layer,
        cell: Cell,
    },
}

impl MutationRequest {
    /// The cell this request targets.
    pub fn cell(&self) -> Cell {
        match self {
            MutationRequest::Place { cell, .. } | MutationRequest::Break { cell, .. } => *cell,
        }
    }

    pub fn layer(&self) -> Layer {
        match self {
            MutationRequest::Place { layer, .. } | MutationRequest::Break { layer, .. } => *layer,
        }
    }
}

/// External probe for dynamic bodies overlapping a cell's world footprint.
/// Physics is out of scope; the session injects whatever it has.
pub trait CollisionProbe {
    fn body_at(&self, cell: Cell) -> bool;
}

impl<F: Fn(Cell) -> bool> CollisionProbe for F {
    fn body_at(&self, cell: Cell) -> bool {
        self(cell)
    }
}

/// A probe that never reports a body. For tests and headless sessions.
pub struct NoBodies;

impl CollisionProbe for NoBodies {
    fn body_at(&self, _cell: Cell) -> bool {
        false
    }
}

/// Cursor presentation for the current target cell.
///
/// Renderers map these to the usual ladder: red when the foreground is
/// blocked (or the cursor is out of range), blue when only the background
/// is blocked, green when both layers are free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorPreview {
    OutOfRange,
    ForegroundBlocked,
    BackgroundBlocked,
    Clear,
}

/// Input gathered by the session for one tick: discrete events
/// (mode toggle, selection scroll) plus the pointer and action state.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub pointer: WorldPos,
    pub toggle_mode: bool,
    /// Selection scroll in slots, usually -1, 0, or +1.
    pub cycle: i32,
    pub primary: bool,
    pub secondary: bool,
}

/// What one tick produced: presentation state for the renderer plus at
/// most one request for the authority.
#[derive(Debug, Clone, Copy)]
pub struct TickOutcome {
    pub cursor: Cell,
    pub preview: CursorPreview,
    /// Sprite to show on the cursor: the selected block in build mode,
    /// `None` in destroy mode (the renderer substitutes its destroy icon).
    pub cursor_sprite: Option<AssetHandle>,
    pub request: Option<MutationRequest>,
    /// One-shot placement sound for the local audio sink, surfaced when a
    /// place request was issued this tick.
    pub place_sound: Option<AssetHandle>,
}

pub struct InteractionState {
    selected: BlockId,
    mode: BuildMode,
    cursor: Cell,
    within_reach: bool,
    anchor: WorldPos,
    max_build_distance: f32,
}

impl InteractionState {
    /// Selection defaults to the first valid registry id; mode to destroy.
    pub fn new(registry: &BlockRegistry) -> Self {
        Self {
            selected: registry.first_id().unwrap_or_default(),
            mode: BuildMode::default(),
            cursor: Cell::new(0, 0),
            within_reach: false,
            anchor: WorldPos::default(),
            max_build_distance: MAX_BUILD_DISTANCE,
        }
    }

    pub fn selected(&self) -> BlockId {
        self.selected
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn cursor(&self) -> Cell {
        self.cursor
    }

    pub fn within_reach(&self) -> bool {
        self.within_reach
    }

    /// Update the participant's anchor (their character position), the
    /// origin reach is measured from.
    pub fn set_anchor(&mut self, anchor: WorldPos) {
        self.anchor = anchor;
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            BuildMode::Destroy => BuildMode::Build,
            BuildMode::Build => BuildMode::Destroy,
        };
    }

    /// Advance the selection by `delta` slots with modular wraparound over
    /// the registry's id space, then skip forward past any unpopulated
    /// slots (a catalog with dropped definitions leaves holes). For a
    /// dense catalog this is exactly `(id + delta + count) mod count`.
    pub fn cycle_selection(&mut self, registry: &BlockRegistry, delta: i32) {
        let count = registry.capacity() as i64;
        if count == 0 {
            return;
        }
        let dir = if delta < 0 { -1 } else { 1 };
        let mut id = (self.selected.0 as i64 + delta as i64).rem_euclid(count);
        for _ in 0..count {
            if registry.get(BlockId(id as u16)).is_some() {
                self.selected = BlockId(id as u16);
                return;
            }
            id = (id + dir).rem_euclid(count);
        }
    }

    /// Run one interaction tick.
    ///
    /// Order matters and follows the input pipeline: cursor cell first,
    /// then mode toggles, then the reach gate (out of range suppresses
    /// every placement/removal action this tick), then selection cycling
    /// and the layer-occupancy preview, and finally request emission.
    pub fn tick(
        &mut self,
        registry: &BlockRegistry,
        grid: &TileGrid,
        probe: &dyn CollisionProbe,
        input: &TickInput,
    ) -> TickOutcome {
        self.cursor = Cell::from_world(input.pointer);

        if input.toggle_mode {
            self.toggle_mode();
        }

        self.within_reach =
            self.anchor.distance(self.cursor.center()) <= self.max_build_distance;

        if !self.within_reach {
            return TickOutcome {
                cursor: self.cursor,
                preview: CursorPreview::OutOfRange,
                cursor_sprite: self.cursor_sprite(registry),
                request: None,
                place_sound: None,
            };
        }

        match self.mode {
            BuildMode::Build => {
                if input.cycle != 0 {
                    self.cycle_selection(registry, input.cycle);
                }

                let foreground_free = grid.query(Layer::Foreground, self.cursor).is_none()
                    && !probe.body_at(self.cursor);
                let background_free = grid.query(Layer::Background, self.cursor).is_none();

                let preview = if !foreground_free {
                    CursorPreview::ForegroundBlocked
                } else if !background_free {
                    CursorPreview::BackgroundBlocked
                } else {
                    CursorPreview::Clear
                };

                let layer = if input.primary && foreground_free {
                    Some(Layer::Foreground)
                } else if input.secondary && background_free {
                    Some(Layer::Background)
                } else {
                    None
                };

                let request = layer.map(|layer| MutationRequest::Place {
                    block: self.selected,
                    layer,
                    cell: self.cursor,
                });
                let place_sound = request
                    .and_then(|_| registry.get(self.selected))
                    .and_then(|def| def.place_sound);

                TickOutcome {
                    cursor: self.cursor,
                    preview,
                    cursor_sprite: self.cursor_sprite(registry),
                    request,
                    place_sound,
                }
            }
            BuildMode::Destroy => {
                let layer = if input.primary {
                    Some(Layer::Foreground)
                } else if input.secondary {
                    Some(Layer::Background)
                } else {
                    None
                };

                TickOutcome {
                    cursor: self.cursor,
                    preview: CursorPreview::Clear,
                    cursor_sprite: None,
                    request: layer.map(|layer| MutationRequest::Break {
                        layer,
                        cell: self.cursor,
                    }),
                    place_sound: None,
                }
            }
        }
    }

    fn cursor_sprite(&self, registry: &BlockRegistry) -> Option<AssetHandle> {
        match self.mode {
            BuildMode::Build => registry.get(self.selected).map(|def| def.sprite),
            BuildMode::Destroy => None,
        }
    }
}
