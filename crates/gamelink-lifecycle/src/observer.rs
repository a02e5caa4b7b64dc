//! The lifecycle observer: hooks the game's event mediator and times plays.
//!
//! The game runtime fires `game:game-start` and `game:game-over` on its
//! mediator. We register one listener for each; the listeners do nothing
//! but push a [`LifecycleEvent`] into a channel. A single task owns the
//! [`PlayTiming`] record and drains that channel, so timing updates are
//! applied one at a time, in the order the game fired them.
//!
//! ```text
//! mediator ──listener──▶ mpsc ──▶ AttachedObserver::run
//!                                   ├─ GameStart → timing.record_start(now)
//!                                   └─ GameOver  → load dashboard, read score,
//!                                                  timing.record_end(now),
//!                                                  handler.game_over(score, &timing)
//! ```

use std::sync::Arc;

use gamelink_host::{CoreModule, DashboardModule, HostError, Mediator, ModuleLoader};
use gamelink_protocol::Score;
use tokio::sync::mpsc;

use crate::{Clock, PlayTiming, Readiness};

/// Mediator event fired when a new game begins.
pub const GAME_START: &str = "game:game-start";

/// Mediator event fired when a game ends.
pub const GAME_OVER: &str = "game:game-over";

/// A lifecycle signal from the game runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    GameStart,
    GameOver,
}

/// Receives finished games.
///
/// Called from the observer task with the play's score and its timing
/// record, which already has `ended_at` set.
pub trait GameOverHandler: Send + Sync + 'static {
    fn game_over(&self, score: Score, timing: &PlayTiming);
}

/// Why the observer didn't attach. None of these reach the user: the game
/// still runs, it just never submits a score on its own.
#[derive(Debug, thiserror::Error)]
pub enum AttachError {
    /// The page has no module loader.
    #[error("no module loader available")]
    NoLoader,

    /// The readiness gate closed without the runtime becoming ready.
    #[error("game runtime never became ready")]
    NotReady,

    /// The core module couldn't be loaded.
    #[error(transparent)]
    Host(#[from] HostError),
}

// ---------------------------------------------------------------------------
// LifecycleObserver
// ---------------------------------------------------------------------------

/// An observer that hasn't attached to the game runtime yet.
pub struct LifecycleObserver<H: GameOverHandler> {
    handler: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<H: GameOverHandler> LifecycleObserver<H> {
    pub fn new(handler: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self { handler, clock }
    }

    /// Waits for `readiness`, loads the core module, and registers the
    /// start/over listeners on its mediator.
    ///
    /// There is no retry: if any step fails, the observer stays detached
    /// for the life of the page.
    ///
    /// # Errors
    /// See [`AttachError`].
    pub async fn attach<L: ModuleLoader>(
        self,
        loader: Option<L>,
        readiness: Readiness,
    ) -> Result<AttachedObserver<L, H>, AttachError> {
        let loader = loader.ok_or(AttachError::NoLoader)?;

        if !readiness.wait().await {
            return Err(AttachError::NotReady);
        }

        let core = loader.load_core().await?;
        let (tx, events) = mpsc::unbounded_channel();

        for (name, event) in [
            (GAME_OVER, LifecycleEvent::GameOver),
            (GAME_START, LifecycleEvent::GameStart),
        ] {
            let tx = tx.clone();
            core.mediator().add_listener(
                name,
                Arc::new(move || {
                    // Fails only once the observer task has ended.
                    let _ = tx.send(event);
                }),
            );
        }

        tracing::info!("lifecycle hooks attached");

        Ok(AttachedObserver {
            loader,
            events,
            timing: PlayTiming::new(),
            handler: self.handler,
            clock: self.clock,
        })
    }
}

// ---------------------------------------------------------------------------
// AttachedObserver
// ---------------------------------------------------------------------------

/// An observer with listeners registered, owning the play timing record.
pub struct AttachedObserver<L: ModuleLoader, H: GameOverHandler> {
    loader: L,
    events: mpsc::UnboundedReceiver<LifecycleEvent>,
    timing: PlayTiming,
    handler: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<L: ModuleLoader, H: GameOverHandler> AttachedObserver<L, H> {
    /// The current play's timing.
    pub fn timing(&self) -> &PlayTiming {
        &self.timing
    }

    /// Processes lifecycle events until every listener has been dropped.
    /// Returns the final timing record.
    pub async fn run(mut self) -> PlayTiming {
        while let Some(event) = self.events.recv().await {
            self.handle(event).await;
        }
        tracing::debug!("lifecycle event channel closed");
        self.timing
    }

    /// Applies a single event.
    pub async fn handle(&mut self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::GameStart => {
                tracing::debug!("game start detected");
                self.timing.record_start(self.clock.now());
            }
            LifecycleEvent::GameOver => {
                tracing::debug!("game over detected");
                let dashboard = match self.loader.load_dashboard().await {
                    Ok(dashboard) => dashboard,
                    Err(e) => {
                        tracing::warn!(error = %e, "cannot read final score, skipping submission");
                        return;
                    }
                };
                let score = dashboard.score();
                self.timing.record_end(self.clock.now());

                tracing::info!(
                    %score,
                    duration_secs = self.timing.duration_secs(),
                    "final score"
                );
                self.handler.game_over(score, &self.timing);
            }
        }
    }
}
