//! Lobby state management for Matchforge.
//!
//! `matchforge-protocol` defines the settings record itself; this
//! crate is the owning collaborator: a [`Lobby`] holds the single
//! current accepted snapshot, applies candidate updates atomically,
//! and fans out [`SettingsChanged`] notifications to subscribers when
//! (and only when) an accepted update actually differs from the
//! current snapshot.
//!
//! # Key types
//!
//! - [`Lobby`] — holds the current [`matchforge_protocol::RoomSettings`]
//! - [`SettingsChanged`] — the change notification, carrying old and new
//! - [`RoomError`] — what can go wrong when applying an update

mod error;
mod lobby;

pub use error::RoomError;
pub use lobby::{Lobby, SettingsChanged};
