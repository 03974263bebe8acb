//! Wire protocol for Matchforge lobby settings synchronization.
//!
//! This crate defines the record that a server and its clients
//! exchange to keep a multiplayer lobby's configuration in sync:
//!
//! - **Settings** ([`RoomSettings`]) — one atomic snapshot of the
//!   lobby's configurable state, with structural equality as the
//!   change-detection contract and a password-masking diagnostic
//!   rendering.
//! - **Collaborator types** ([`Mod`], [`ModParam`], [`ModValue`],
//!   [`MatchType`]) — the values carried inside the record.
//! - **Wire encoding** ([`wire`]) — a field-indexed, forward-compatible
//!   binary format. Unknown field indices are skipped; unknown enum
//!   ordinals are rejected.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   decoding. Encoding never fails.
//!
//! The protocol layer knows nothing about transports or room
//! membership — it only defines the shape, equality law, and encoding
//! of the settings record. The owning lobby lives in
//! `matchforge-room`.

mod error;
mod settings;
mod types;
pub mod wire;

pub use error::ProtocolError;
pub use settings::{field_index, RoomSettings};
pub use types::{MatchType, Mod, ModParam, ModValue, RoomId};
