//! Error types for the protocol layer.
//!
//! Each crate in Gamelink defines its own error enum. A `ProtocolError`
//! always means the problem is in serialization, never in the host window
//! or the session.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// For inbound traffic this is routine: the window's message channel
    /// also carries messages from unrelated scripts.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
