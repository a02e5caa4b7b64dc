//! Bridge configuration.

use std::time::Duration;

use gamelink_lifecycle::DEFAULT_STARTUP_DELAY;
use gamelink_protocol::WILDCARD_ORIGIN;

/// Game type reported in `finalStats.gameType` unless configured otherwise.
pub const DEFAULT_GAME_TYPE: &str = "ball-and-wall";

/// Settings for a [`Bridge`](crate::Bridge).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// How long to wait for the game runtime before attaching lifecycle
    /// hooks, when it can't signal readiness itself.
    pub startup_delay: Duration,

    /// Value of `metadata.finalStats.gameType` on every submission.
    pub game_type: String,

    /// Origin outbound messages are restricted to. `"*"` (the default)
    /// delivers to whatever document the opener holds.
    pub target_origin: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            startup_delay: DEFAULT_STARTUP_DELAY,
            game_type: DEFAULT_GAME_TYPE.to_string(),
            target_origin: WILDCARD_ORIGIN.to_string(),
        }
    }
}

impl BridgeConfig {
    /// Longest startup delay we accept. Past this the player has long
    /// since started playing without hooks.
    pub const MAX_STARTUP_DELAY: Duration = Duration::from_secs(30);

    /// Fixes out-of-range values so the config is safe to use.
    ///
    /// Called automatically by the builder. Rules:
    /// - `startup_delay` capped to [`Self::MAX_STARTUP_DELAY`].
    /// - An empty `game_type` or `target_origin` falls back to its default.
    pub fn validated(mut self) -> Self {
        if self.startup_delay > Self::MAX_STARTUP_DELAY {
            tracing::warn!(
                delay_ms = self.startup_delay.as_millis() as u64,
                max_ms = Self::MAX_STARTUP_DELAY.as_millis() as u64,
                "startup delay exceeds maximum, clamping"
            );
            self.startup_delay = Self::MAX_STARTUP_DELAY;
        }
        if self.game_type.trim().is_empty() {
            tracing::warn!("empty game type, using default");
            self.game_type = DEFAULT_GAME_TYPE.to_string();
        }
        if self.target_origin.trim().is_empty() {
            tracing::warn!("empty target origin, using wildcard");
            self.target_origin = WILDCARD_ORIGIN.to_string();
        }
        self
    }
}
