//! Game lifecycle observation for Gamelink.
//!
//! Watches the embedded game's `game:game-start` / `game:game-over`
//! signals, times each play, and hands the final score to a
//! [`GameOverHandler`].
//!
//! # Attaching
//!
//! The game runtime boots on its own schedule, so attaching is gated on a
//! [`Readiness`]. A runtime that can announce itself should use
//! [`Readiness::channel`]; otherwise [`Readiness::Delay`] waits a fixed
//! time (one second by default) and hopes for the best. Either way, a
//! failed attach is silent: no hooks, no automatic submissions.
//!
//! ```ignore
//! let observer = LifecycleObserver::new(handler, Arc::new(SystemClock));
//! let attached = observer.attach(Some(loader), Readiness::default()).await?;
//! tokio::spawn(attached.run());
//! ```

mod observer;
mod readiness;
mod timing;

pub use observer::{
    AttachError, AttachedObserver, GAME_OVER, GAME_START, GameOverHandler,
    LifecycleEvent, LifecycleObserver,
};
pub use readiness::{DEFAULT_STARTUP_DELAY, ReadyNotifier, Readiness};
pub use timing::{Clock, ManualClock, PlayTiming, SystemClock};
