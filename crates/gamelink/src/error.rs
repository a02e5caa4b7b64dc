//! Unified error type for the Gamelink bridge.

use gamelink_host::HostError;
use gamelink_protocol::ProtocolError;
use gamelink_session::SessionError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GamelinkError {
    /// Encoding an outbound message failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The launch URL or session parameters are unusable.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The host window or opener refused an operation.
    #[error(transparent)]
    Host(#[from] HostError),
}
