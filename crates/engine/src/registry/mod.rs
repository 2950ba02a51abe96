//! Block type catalog: discovery, id assignment, and lookup.
//!
//! Block types register themselves through an explicit, ordered list of
//! [`BlockFactory`] functions handed to [`BlockRegistry::build`]. The
//! registry is built once at process start, single-threaded, and is
//! immutable (and freely shareable) afterwards.

use thiserror::Error;

/// Opaque block identifier. Dense-ish: ids live in `[0, capacity)` where
/// capacity is the number of registered block types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub u16);

impl BlockId {
    pub const fn new(id: u16) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque handle to an externally owned asset (sprite, audio clip).
/// The engine stores and hands these back without interpreting them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetHandle(pub &'static str);

/// What one block type declares about itself at registration time.
///
/// `declared_id: None` is the "unassigned" sentinel: the registry picks
/// the next free slot. Explicit ids are honored as-is, which lets a type
/// pin its wire id across catalog reorderings.
#[derive(Debug, Clone)]
pub struct BlockSpec {
    pub declared_id: Option<u16>,
    pub name: &'static str,
    pub sprite: AssetHandle,
    pub place_sound: Option<AssetHandle>,
}

/// One entry in the registration list. Invoking the factory is the block
/// type's one-shot initialization hook; the registry calls each factory
/// exactly once per process, during [`BlockRegistry::build`].
pub type BlockFactory = fn() -> BlockSpec;

/// Immutable catalog entry, owned by the registry for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDefinition {
    pub id: BlockId,
    pub name: &'static str,
    pub sprite: AssetHandle,
    pub place_sound: Option<AssetHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("block id {0} is not registered")]
    InvalidBlockId(BlockId),
}

/// Build-once, read-many table mapping block id to definition.
///
/// Slots may be empty: a definition whose declared id conflicts with an
/// earlier one, or falls outside the table, is dropped from lookup (the
/// build logs a warning and continues -- catalog problems are never fatal).
pub struct BlockRegistry {
    slots: Vec<Option<BlockDefinition>>,
}

impl BlockRegistry {
    /// Instantiate every registered block type and resolve its id.
    ///
    /// Sentinel ids are assigned from a monotonic cursor that skips slots
    /// already claimed by explicit ids, so `{None, Some(2), None}` resolves
    /// to `{0, 2, 1}` without a conflict. Explicit ids that collide keep
    /// the first writer; the later definition is dropped. Ids outside
    /// `[0, capacity)` are dropped.
    pub fn build(factories: &[BlockFactory]) -> Self {
        let capacity = factories.len();
        let mut slots: Vec<Option<BlockDefinition>> = vec![None; capacity];
        let mut next_free: usize = 0;

        for factory in factories {
            let spec = factory();

            let id = match spec.declared_id {
                Some(declared) => {
                    let declared = declared as usize;
                    if declared >= capacity {
                        tracing::warn!(
                            "Block '{}' has invalid id {} (max id {}), dropped",
                            spec.name,
                            declared,
                            capacity.saturating_sub(1),
                        );
                        continue;
                    }
                    declared
                }
                None => {
                    while next_free < capacity && slots[next_free].is_some() {
                        next_free += 1;
                    }
                    // Can't run off the end: the table has one slot per factory.
                    debug_assert!(next_free < capacity);
                    next_free
                }
            };

            if let Some(existing) = &slots[id] {
                tracing::warn!(
                    "Block '{}' conflicts with block '{}' (block id {}), dropped",
                    spec.name,
                    existing.name,
                    id,
                );
                continue;
            }

            slots[id] = Some(BlockDefinition {
                id: BlockId(id as u16),
                name: spec.name,
                sprite: spec.sprite,
                place_sound: spec.place_sound,
            });
        }

        Self { slots }
    }

    /// Look up a definition, failing for out-of-range or never-populated ids.
    pub fn lookup(&self, id: BlockId) -> Result<&BlockDefinition, LookupError> {
        self.get(id).ok_or(LookupError::InvalidBlockId(id))
    }

    pub fn get(&self, id: BlockId) -> Option<&BlockDefinition> {
        self.slots.get(id.0 as usize)?.as_ref()
    }

    /// Every registered definition as `(id, name)`, in ascending id order.
    ///
    /// Names are indexed by final id, so a selection list built from this
    /// can never desync from the ids it displays.
    pub fn enumerate(&self) -> impl Iterator<Item = (BlockId, &'static str)> + '_ {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref().map(|def| (def.id, def.name)))
    }

    /// The lowest registered id, if any. Used as the default selection.
    pub fn first_id(&self) -> Option<BlockId> {
        self.enumerate().next().map(|(id, _)| id)
    }

    /// Table size: one slot per registration-list entry, populated or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of definitions that survived the build.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
