/// Errors that can occur at the boundary with the host window.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// There is no opener, or the opener has been closed.
    #[error("opener window is missing or closed")]
    OpenerUnavailable,

    /// The opener exists but refused the message.
    #[error("post failed: {0}")]
    PostFailed(String),

    /// A game module could not be loaded (loader missing, module not
    /// registered yet, or the game runtime failed to boot).
    #[error("module `{0}` unavailable")]
    ModuleUnavailable(String),
}
