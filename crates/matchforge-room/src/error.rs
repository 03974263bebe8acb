//! Error types for the room layer.

use matchforge_protocol::ProtocolError;

/// Errors that can occur while updating a lobby.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// An incoming settings update could not be decoded. The lobby
    /// keeps its previously accepted settings; the UI layer should
    /// surface a transient "could not apply room update" condition.
    #[error("could not apply room update: {0}")]
    BadUpdate(#[from] ProtocolError),
}
