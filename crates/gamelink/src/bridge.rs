//! `Bridge` builder and the handshake with the opener window.
//!
//! This is the entry point for an embedded game. It ties together all the
//! layers: session → lifecycle → protocol → host window.
//!
//! ```text
//!   start() ── valid? ──no──▶ alert + exit_game()
//!      │yes
//!      ▼
//!   (readiness) ─▶ attach hooks ─▶ game-over ─▶ submit_score() ─▶ SUBMIT_SCORE
//!
//!   handle_message() ◀── SCORE_SUBMISSION_SUCCESS / _ERROR / anything else
//!   on_unload()      ──▶ EXIT_GAME
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::SecondsFormat;
use gamelink_host::{HostError, HostWindow, ModuleLoader, Opener};
use gamelink_lifecycle::{
    Clock, GameOverHandler, LifecycleObserver, PlayTiming, Readiness,
    SystemClock,
};
use gamelink_protocol::{
    Codec, FinalStats, InboundMessage, JsonCodec, OutboundMessage, Score,
    SubmissionMetadata,
};
use gamelink_session::SessionContext;
use tokio::task::JoinHandle;

use crate::{alerts, BridgeConfig, GamelinkError};

/// What happened to a [`Bridge::submit_score`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// One `SUBMIT_SCORE` message was posted to the opener.
    Sent,
    /// The session is invalid; the player was told and the window closed.
    InvalidSession,
    /// No live opener; the player was told. The score is lost.
    OpenerUnavailable,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for configuring a [`Bridge`].
///
/// # Example
///
/// ```rust
/// use gamelink::prelude::*;
/// use gamelink::host::memory::{MemoryOpener, MemoryWindow};
///
/// let window = MemoryWindow::with_opener(MemoryOpener::new());
/// let session = SessionContext::from_query("user_id=u&room_id=r&session_token=t");
///
/// let bridge = BridgeBuilder::new()
///     .game_type("ball-and-wall")
///     .build(window, session);
/// assert!(bridge.session().is_valid());
/// ```
pub struct BridgeBuilder {
    config: BridgeConfig,
    clock: Arc<dyn Clock>,
}

impl BridgeBuilder {
    /// Creates a new builder with default settings and the system clock.
    pub fn new() -> Self {
        Self {
            config: BridgeConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets how long [`Bridge::start`] waits before attaching hooks.
    pub fn startup_delay(mut self, delay: Duration) -> Self {
        self.config.startup_delay = delay;
        self
    }

    /// Sets the `finalStats.gameType` reported with each score.
    pub fn game_type(mut self, game_type: &str) -> Self {
        self.config.game_type = game_type.to_string();
        self
    }

    /// Restricts outbound messages to one origin instead of `"*"`.
    pub fn target_origin(mut self, origin: &str) -> Self {
        self.config.target_origin = origin.to_string();
        self
    }

    /// Sets the clock used for play timing and `gameEndTime`.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Builds a bridge that speaks JSON to the opener.
    pub fn build<W: HostWindow>(
        self,
        window: W,
        session: SessionContext,
    ) -> Arc<Bridge<W, JsonCodec>> {
        self.build_with_codec(window, session, JsonCodec)
    }

    /// Builds a bridge from the page's full launch URL.
    ///
    /// # Errors
    /// Returns [`GamelinkError::Session`] if the URL can't be parsed. A
    /// parseable URL with missing parameters still builds; validity is
    /// checked on [`Bridge::start`].
    pub fn build_from_url<W: HostWindow>(
        self,
        window: W,
        launch_url: &str,
    ) -> Result<Arc<Bridge<W, JsonCodec>>, GamelinkError> {
        let session = SessionContext::from_url(launch_url)?;
        Ok(self.build(window, session))
    }

    /// Builds a bridge with a custom codec.
    pub fn build_with_codec<W: HostWindow, C: Codec>(
        self,
        window: W,
        session: SessionContext,
        codec: C,
    ) -> Arc<Bridge<W, C>> {
        tracing::info!(
            user_id = session.user_id(),
            room_id = session.room_id(),
            on_chain_room_id = session.on_chain_room_id(),
            game_id = session.game_id(),
            has_session_token = session.session_token().is_some(),
            game_name = session.game_name(),
            currency = session.currency(),
            total_prize_pool = session.total_prize_pool(),
            "game session loaded"
        );

        Arc::new(Bridge {
            window,
            codec,
            session,
            config: self.config.validated(),
            clock: self.clock,
            started: AtomicBool::new(false),
            has_submitted: AtomicBool::new(false),
        })
    }
}

impl Default for BridgeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Bridge
// ---------------------------------------------------------------------------

/// The embedded game's side of the handshake with its opener.
///
/// Always held in an `Arc`: the lifecycle task keeps a clone so it can
/// submit scores when the game ends.
pub struct Bridge<W: HostWindow, C: Codec = JsonCodec> {
    window: W,
    codec: C,
    session: SessionContext,
    config: BridgeConfig,
    clock: Arc<dyn Clock>,
    started: AtomicBool,
    /// Set by the first successful submission reply. Informational only.
    has_submitted: AtomicBool,
}

impl<W, C> Bridge<W, C>
where
    W: HostWindow,
    C: Codec,
{
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    /// `true` once the host has acknowledged at least one submission.
    pub fn has_submitted(&self) -> bool {
        self.has_submitted.load(Ordering::SeqCst)
    }

    /// Checks the session and, if it is invalid, tells the player and
    /// closes the window.
    ///
    /// Returns `false` when the caller must stop what it was doing.
    pub fn assert_valid_or_abort(&self) -> bool {
        if self.session.is_valid() {
            return true;
        }
        tracing::warn!(
            missing = ?self.session.missing_fields(),
            "invalid game session"
        );
        self.window.alert(alerts::INVALID_SESSION);
        self.exit_game();
        false
    }

    /// Closes the game window. The opener's room session stays active.
    pub fn exit_game(&self) {
        tracing::info!("closing game window");
        if self.window.live_opener().is_some() {
            // Nothing is posted on this path; the unload hook sends
            // EXIT_GAME. Reserved for a dedicated close notification.
            tracing::debug!("opener still open, leaving room session active");
        }
        self.window.close();
    }

    /// Sends a finished game's score to the opener.
    ///
    /// Each call is independent: nothing is de-duplicated or retried, and
    /// the host's reply arrives later through [`handle_message`].
    ///
    /// # Errors
    /// Returns an error if the message can't be encoded or the opener
    /// rejects it. Invalid sessions and a missing opener are not errors;
    /// see [`SubmitOutcome`].
    ///
    /// [`handle_message`]: Self::handle_message
    pub fn submit_score(
        &self,
        final_score: Score,
        timing: &PlayTiming,
    ) -> Result<SubmitOutcome, GamelinkError> {
        if !self.assert_valid_or_abort() {
            return Ok(SubmitOutcome::InvalidSession);
        }

        tracing::info!(score = %final_score, "submitting score");
        let game_duration = timing.duration_secs();

        let message = OutboundMessage::SubmitScore {
            score: final_score,
            ids: self.session.ids(),
            metadata: SubmissionMetadata {
                game_duration,
                game_end_time: self
                    .clock
                    .now()
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
                final_stats: FinalStats {
                    total_score: final_score,
                    time_played: game_duration,
                    game_type: self.config.game_type.clone(),
                },
            },
        };

        match self.post(&message) {
            Ok(()) => Ok(SubmitOutcome::Sent),
            Err(GamelinkError::Host(HostError::OpenerUnavailable)) => {
                tracing::warn!("opener unavailable, score not submitted");
                self.window.alert(alerts::OPENER_UNAVAILABLE);
                Ok(SubmitOutcome::OpenerUnavailable)
            }
            Err(e) => Err(e),
        }
    }

    /// The standing listener for every message the window receives.
    ///
    /// Bytes that aren't a protocol message at all are ignored, like any
    /// other message type we don't know.
    pub fn handle_message(&self, data: &[u8]) {
        match self.codec.decode::<InboundMessage>(data) {
            Ok(reply) => self.handle_reply(reply),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring undecodable message");
            }
        }
    }

    /// Reacts to a reply the host already decoded.
    pub fn handle_reply(&self, reply: InboundMessage) {
        match reply {
            InboundMessage::ScoreSubmissionSuccess {
                updated,
                new_score,
                previous_score,
            } => {
                tracing::info!(
                    updated,
                    new_score = ?new_score,
                    previous_score = ?previous_score,
                    "score submission successful"
                );
                self.has_submitted.store(true, Ordering::SeqCst);
                self.window.alert(&alerts::submission_success(
                    updated,
                    new_score,
                    previous_score,
                ));
            }
            InboundMessage::ScoreSubmissionError { error } => {
                tracing::warn!(error = ?error, "score submission failed");
                self.window
                    .alert(&alerts::submission_error(error.as_deref()));
            }
            InboundMessage::Unknown => {
                tracing::debug!("ignoring message of unknown type");
            }
        }
    }

    /// Tells the opener the game window is going away.
    ///
    /// Never blocks and never fails: if there's no live opener, or it
    /// refuses the message, teardown carries on. Returns whether an
    /// `EXIT_GAME` message was posted.
    pub fn on_unload(&self) -> bool {
        let message = OutboundMessage::ExitGame {
            ids: self.session.ids(),
        };
        match self.post(&message) {
            Ok(()) => true,
            Err(GamelinkError::Host(HostError::OpenerUnavailable)) => {
                tracing::debug!("no live opener at unload");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to notify opener of exit");
                false
            }
        }
    }

    /// Encodes `message` and posts it to the live opener.
    fn post(&self, message: &OutboundMessage) -> Result<(), GamelinkError> {
        let opener = self
            .window
            .live_opener()
            .ok_or(HostError::OpenerUnavailable)?;
        let data = self.codec.encode(message)?;
        opener.post_message(&data, &self.config.target_origin)?;
        tracing::debug!(kind = message.kind(), bytes = data.len(), "message posted");
        Ok(())
    }

    /// Starts the bridge once the document is interactive, waiting
    /// [`BridgeConfig::startup_delay`] for the game runtime.
    ///
    /// See [`start_with`](Self::start_with).
    pub fn start<L: ModuleLoader>(
        self: &Arc<Self>,
        loader: Option<L>,
    ) -> Option<JoinHandle<()>> {
        self.start_with(loader, Readiness::Delay(self.config.startup_delay))
    }

    /// Validates the session and, if it's valid, attaches lifecycle hooks
    /// in the background once `readiness` opens.
    ///
    /// Must be called from within a Tokio runtime. Only the first call
    /// does anything; later calls return `None`. An invalid session also
    /// returns `None` after telling the player and closing the window.
    pub fn start_with<L: ModuleLoader>(
        self: &Arc<Self>,
        loader: Option<L>,
        readiness: Readiness,
    ) -> Option<JoinHandle<()>> {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::debug!("bridge already started");
            return None;
        }
        if !self.assert_valid_or_abort() {
            return None;
        }

        let observer =
            LifecycleObserver::new(Arc::clone(self), Arc::clone(&self.clock));
        Some(tokio::spawn(async move {
            match observer.attach(loader, readiness).await {
                Ok(attached) => {
                    attached.run().await;
                }
                Err(e) => {
                    tracing::debug!(
                        error = %e,
                        "lifecycle hooks not attached, scores will not be submitted automatically"
                    );
                }
            }
        }))
    }
}

impl<W, C> GameOverHandler for Bridge<W, C>
where
    W: HostWindow,
    C: Codec,
{
    fn game_over(&self, score: Score, timing: &PlayTiming) {
        if let Err(e) = self.submit_score(score, timing) {
            tracing::warn!(error = %e, "score submission failed to send");
        }
    }
}
