//! Host abstraction layer for Gamelink.
//!
//! The embedded game never talks to a browser API directly. It goes
//! through the traits in this crate:
//!
//! - [`HostWindow`]: the embedded document's own window. It can alert the
//!   player and close itself, and it holds a weak reference to its [`Opener`].
//! - [`Opener`]: the window that launched the game. We only check whether
//!   it is still open and post bytes to it; we never own it.
//! - [`ModuleLoader`]: the game runtime's named-module loader, which hands
//!   out the [`CoreModule`] (with its event [`Mediator`]) and the
//!   [`DashboardModule`] (with the current score).
//!
//! # Feature Flags
//!
//! - `memory` (default): an in-process host ([`memory`]) for tests, demos
//!   and headless embedding.

mod error;
#[cfg(feature = "memory")]
pub mod memory;

pub use error::HostError;

use std::future::Future;
use std::sync::Arc;

use gamelink_protocol::Score;

/// Module name the game runtime registers its core (mediator) under.
pub const CORE_MODULE: &str = "app/core/_";

/// Module name the game runtime registers its score dashboard under.
pub const DASHBOARD_MODULE: &str = "app/dashboard";

// ---------------------------------------------------------------------------
// Windows
// ---------------------------------------------------------------------------

/// The window that launched the embedded game.
pub trait Opener: Send + Sync + 'static {
    /// `true` once the user has closed the opener (or navigated it away).
    fn is_closed(&self) -> bool;

    /// Posts an encoded message to the opener.
    ///
    /// `target_origin` restricts which document may receive it; `"*"`
    /// means any.
    fn post_message(
        &self,
        data: &[u8],
        target_origin: &str,
    ) -> Result<(), HostError>;
}

/// The embedded document's own window.
pub trait HostWindow: Send + Sync + 'static {
    /// The opener type this window refers to.
    type Opener: Opener;

    /// The launching window, if there is one.
    fn opener(&self) -> Option<&Self::Opener>;

    /// Shows a blocking, user-facing message.
    fn alert(&self, message: &str);

    /// Closes this window. Hosts that cannot close themselves may ignore it.
    fn close(&self);

    /// The opener, but only if it is still open.
    ///
    /// Every send goes through this check; the opener can disappear at any
    /// time without telling us.
    fn live_opener(&self) -> Option<&Self::Opener> {
        self.opener().filter(|opener| !opener.is_closed())
    }
}

// ---------------------------------------------------------------------------
// Game runtime modules
// ---------------------------------------------------------------------------

/// A callback registered on the game's event mediator.
pub type Listener = Arc<dyn Fn() + Send + Sync + 'static>;

/// The game runtime's event bus.
pub trait Mediator: Send + Sync + 'static {
    /// Calls `listener` every time `event` fires.
    fn add_listener(&self, event: &str, listener: Listener);
}

/// The game's core module.
pub trait CoreModule: Send + Sync + 'static {
    type Mediator: Mediator;

    fn mediator(&self) -> &Self::Mediator;
}

/// The game's score dashboard.
pub trait DashboardModule: Send + 'static {
    /// The score currently shown to the player.
    fn score(&self) -> Score;
}

/// Loads the game runtime's named modules.
///
/// Both loads are asynchronous: the runtime may still be booting when we
/// ask. A failed load is reported as [`HostError::ModuleUnavailable`].
pub trait ModuleLoader: Send + Sync + 'static {
    type Core: CoreModule;
    type Dashboard: DashboardModule;

    /// Loads [`CORE_MODULE`].
    fn load_core(
        &self,
    ) -> impl Future<Output = Result<Self::Core, HostError>> + Send;

    /// Loads [`DASHBOARD_MODULE`].
    fn load_dashboard(
        &self,
    ) -> impl Future<Output = Result<Self::Dashboard, HostError>> + Send;
}
