//! Error types for the protocol layer.
//!
//! A failed decode never yields a partial record — the caller keeps
//! whatever settings it last accepted and discards the update.

/// Errors that can occur while decoding wire data.
///
/// There is deliberately no "recoverable" variant: any decode failure
/// means the whole incoming record is rejected. Retry/backoff policy
/// belongs to the transport, not here.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The byte stream is structurally broken: truncated input, a
    /// missing or duplicated field index, a field whose type tag does
    /// not match the index table, or a string that is not valid UTF-8.
    #[error("malformed data: {0}")]
    MalformedData(String),

    /// An enum field carried an ordinal this build does not know.
    ///
    /// Unlike an unknown *field index* (skipped for forward
    /// compatibility), an unknown ordinal in a known field would
    /// misrepresent the room's actual mode if defaulted, so it is
    /// always an error.
    #[error("unknown {kind} variant tag {tag}")]
    UnknownVariant { kind: &'static str, tag: u8 },
}

impl ProtocolError {
    /// Shorthand for a [`ProtocolError::MalformedData`] with a formatted message.
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedData(msg.into())
    }
}
