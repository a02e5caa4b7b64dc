//! # Gamelink
//!
//! The handshake between an embedded browser game and the window that
//! launched it.
//!
//! A game room page opens the game with its session in the query string.
//! Gamelink checks that session, times each play through the game's own
//! lifecycle events, posts the final score back to the room page, and
//! tells the room page when the game window goes away.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gamelink::prelude::*;
//! use gamelink::host::memory::{MemoryLoader, MemoryOpener, MemoryWindow};
//!
//! # async fn run() {
//! let window = MemoryWindow::with_opener(MemoryOpener::new());
//! let session = SessionContext::from_query("?user_id=u&room_id=r&session_token=t");
//!
//! let bridge = BridgeBuilder::new().build(window, session);
//! bridge.start(Some(MemoryLoader::new()));
//! // Route the window's inbound messages to `bridge.handle_message(..)`
//! // and call `bridge.on_unload()` from the unload hook.
//! # }
//! ```

mod alerts;
mod bridge;
mod config;
mod error;

pub use alerts::{INVALID_SESSION, OPENER_UNAVAILABLE};
pub use bridge::{Bridge, BridgeBuilder, SubmitOutcome};
pub use config::{BridgeConfig, DEFAULT_GAME_TYPE};
pub use error::GamelinkError;

pub use gamelink_host as host;
pub use gamelink_lifecycle as lifecycle;
pub use gamelink_protocol as protocol;
pub use gamelink_session as session;

pub mod prelude {
    //! Everything an embedding page needs in one import.

    pub use crate::{
        Bridge, BridgeBuilder, BridgeConfig, GamelinkError, SubmitOutcome,
    };
    pub use gamelink_host::{
        CoreModule, DashboardModule, HostError, HostWindow, Listener,
        Mediator, ModuleLoader, Opener,
    };
    pub use gamelink_lifecycle::{
        Clock, GAME_OVER, GAME_START, ManualClock, PlayTiming, Readiness,
        ReadyNotifier, SystemClock,
    };
    pub use gamelink_protocol::{
        Codec, InboundMessage, JsonCodec, OutboundMessage, Score,
    };
    pub use gamelink_session::{SessionContext, SessionError};
}
