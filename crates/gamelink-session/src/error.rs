//! Error types for the session layer.

/// Errors that can occur while building or checking a session context.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The launch URL could not be parsed at all.
    #[error("malformed launch url: {0}")]
    MalformedUrl(#[from] url::ParseError),

    /// One or more required launch parameters are missing or empty.
    /// The game must not start, and no score may be submitted.
    #[error("invalid game session: missing {}", .missing.join(", "))]
    Invalid { missing: Vec<&'static str> },
}
