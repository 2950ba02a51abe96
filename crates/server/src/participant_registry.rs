//! Shared roster of connected participants.
//!
//! Tracks every participant's name and anchor position and broadcasts
//! join/leave events so connections can relay presence to their clients.
//! Anchors feed the authority's reach gate.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use blockgrid_engine::grid::WorldPos;
use tokio::sync::broadcast;

/// Information about one connected participant.
#[derive(Clone, Debug)]
pub struct ParticipantInfo {
    pub conn_id: u64,
    pub name: String,
    /// Anchor position reach is measured from (the character's location).
    pub anchor: WorldPos,
}

/// Lifecycle events broadcast to all connections.
///
/// Anchor updates are deliberately not broadcast -- they arrive at high
/// frequency and are only read point-wise by the authority.
#[derive(Clone, Debug)]
pub enum ParticipantEvent {
    Joined { conn_id: u64, name: String },
    Left { conn_id: u64 },
}

/// Thread-safe participant roster.
///
/// Uses `std::sync::RwLock` because every operation is brief (no awaits
/// while the lock is held) and the access pattern is read-heavy.
pub struct ParticipantRegistry {
    participants: RwLock<HashMap<u64, ParticipantInfo>>,
    next_conn_id: AtomicU64,
    event_tx: broadcast::Sender<ParticipantEvent>,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            participants: RwLock::new(HashMap::new()),
            next_conn_id: AtomicU64::new(1),
            event_tx,
        }
    }

    /// Allocate a unique connection id for a new participant.
    pub fn allocate_conn_id(&self) -> u64 {
        self.next_conn_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Register a participant and broadcast [`ParticipantEvent::Joined`].
    ///
    /// Call this *after* subscribing and sending the welcome state, so the
    /// newcomer doesn't receive its own join event.
    pub fn register(&self, info: ParticipantInfo) {
        let event = ParticipantEvent::Joined {
            conn_id: info.conn_id,
            name: info.name.clone(),
        };
        self.participants
            .write()
            .expect("participant registry poisoned")
            .insert(info.conn_id, info);
        // Best-effort: if no subscribers yet, the send fails silently.
        let _ = self.event_tx.send(event);
    }

    /// Update a participant's anchor position.
    pub fn update_anchor(&self, conn_id: u64, anchor: WorldPos) {
        let mut participants = self
            .participants
            .write()
            .expect("participant registry poisoned");
        if let Some(info) = participants.get_mut(&conn_id) {
            info.anchor = anchor;
        }
    }

    /// Last known anchor for a participant, if still connected.
    pub fn anchor(&self, conn_id: u64) -> Option<WorldPos> {
        self.participants
            .read()
            .expect("participant registry poisoned")
            .get(&conn_id)
            .map(|info| info.anchor)
    }

    /// Remove a participant and broadcast [`ParticipantEvent::Left`].
    pub fn deregister(&self, conn_id: u64) {
        let info = self
            .participants
            .write()
            .expect("participant registry poisoned")
            .remove(&conn_id);
        if info.is_some() {
            let _ = self.event_tx.send(ParticipantEvent::Left { conn_id });
        }
    }

    /// Snapshot of all currently registered participants.
    pub fn snapshot(&self) -> Vec<ParticipantInfo> {
        self.participants
            .read()
            .expect("participant registry poisoned")
            .values()
            .cloned()
            .collect()
    }

    /// Number of currently connected participants.
    pub fn count(&self) -> usize {
        self.participants
            .read()
            .expect("participant registry poisoned")
            .len()
    }

    /// Subscribe to participant lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<ParticipantEvent> {
        self.event_tx.subscribe()
    }
}

impl Default for ParticipantRegistry {
    fn default() -> Self {
        Self::new()
    }
}
