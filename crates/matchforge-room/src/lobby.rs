//! The lobby: owner of the current accepted settings snapshot.
//!
//! The settings record itself is a pure value; all state transitions
//! live here. A candidate update either replaces the whole snapshot
//! (and fires a change notification) or leaves it untouched — readers
//! never observe a partially-applied mix of fields.

use matchforge_protocol::{RoomId, RoomSettings};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::RoomError;

/// Buffered change notifications per subscriber. Slow subscribers that
/// fall further behind see `RecvError::Lagged`, per broadcast channel
/// semantics.
const EVENT_CAPACITY: usize = 16;

/// Fired whenever a lobby accepts a settings update that differs from
/// the current snapshot. Carries both snapshots so consumers can diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsChanged {
    pub room_id: RoomId,
    pub old: RoomSettings,
    pub new: RoomSettings,
}

/// A multiplayer lobby, holding exactly one current [`RoomSettings`]
/// snapshot at a time.
///
/// Change detection is structural equality on the whole record: a
/// candidate equal to the current snapshot is a no-op, anything else
/// replaces it wholesale and notifies subscribers. Callers never
/// compare identities or merge individual fields.
#[derive(Debug)]
pub struct Lobby {
    room_id: RoomId,
    settings: RoomSettings,
    events: broadcast::Sender<SettingsChanged>,
}

impl Lobby {
    /// Creates a lobby with default settings.
    pub fn new(room_id: RoomId) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            room_id,
            settings: RoomSettings::default(),
            events,
        }
    }

    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// The current accepted settings snapshot.
    pub fn settings(&self) -> &RoomSettings {
        &self.settings
    }

    /// Subscribes to settings-change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SettingsChanged> {
        self.events.subscribe()
    }

    /// Applies a candidate settings record.
    ///
    /// Returns `true` if the candidate differed from the current
    /// snapshot (it has been accepted and subscribers were notified),
    /// `false` if it was equal and nothing happened.
    pub fn apply(&mut self, candidate: RoomSettings) -> bool {
        if self.settings == candidate {
            tracing::debug!(room = %self.room_id, "settings unchanged, skipping broadcast");
            return false;
        }

        let old = std::mem::replace(&mut self.settings, candidate);
        tracing::info!(room = %self.room_id, settings = %self.settings, "room settings changed");

        // Nobody subscribed yet is fine; the snapshot is still updated.
        let _ = self.events.send(SettingsChanged {
            room_id: self.room_id,
            old,
            new: self.settings.clone(),
        });
        true
    }

    /// Decodes an incoming settings update and applies it.
    ///
    /// On decode failure the current snapshot is left intact and the
    /// error is returned for the caller to surface.
    pub fn apply_encoded(&mut self, bytes: &[u8]) -> Result<bool, RoomError> {
        let candidate = RoomSettings::from_bytes(bytes).inspect_err(|err| {
            tracing::warn!(room = %self.room_id, %err, "rejected room settings update");
        })?;
        Ok(self.apply(candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_lobby_starts_with_defaults() {
        let lobby = Lobby::new(RoomId(1));
        assert_eq!(*lobby.settings(), RoomSettings::default());
    }

    #[test]
    fn test_apply_equal_candidate_is_a_noop() {
        let mut lobby = Lobby::new(RoomId(1));
        assert!(!lobby.apply(RoomSettings::default()));
    }

    #[test]
    fn test_apply_replaces_the_whole_snapshot() {
        let mut lobby = Lobby::new(RoomId(1));
        let mut candidate = RoomSettings::default();
        candidate.name = "weekend lobby".into();
        candidate.beatmap_id = 42;

        assert!(lobby.apply(candidate.clone()));
        assert_eq!(*lobby.settings(), candidate);
    }

    #[test]
    fn test_apply_encoded_rejects_garbage_and_keeps_state() {
        let mut lobby = Lobby::new(RoomId(1));
        let mut accepted = RoomSettings::default();
        accepted.name = "kept".into();
        lobby.apply(accepted.clone());

        let err = lobby.apply_encoded(b"definitely not a record").unwrap_err();
        assert!(matches!(err, RoomError::BadUpdate(_)));
        assert_eq!(*lobby.settings(), accepted);
    }
}
