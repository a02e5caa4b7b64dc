//! Clocks and the per-play timing record.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of wall-clock time.
///
/// Durations are reported to the host as wall-clock differences, so this is
/// UTC time rather than a monotonic `Instant`.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Jumps to `at`. Going backwards is allowed.
    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let delta = TimeDelta::from_std(by).unwrap_or(TimeDelta::MAX);
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now = now.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::<Utc>::default())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// PlayTiming
// ---------------------------------------------------------------------------

/// Start and end of the current play.
///
/// ```text
///   game-start ──▶ started_at = now, ended_at = None
///   game-over  ──▶ ended_at = now (never before started_at)
/// ```
///
/// Every `game-start` resets the record, so consecutive plays never see
/// each other's timestamps. Repeated or out-of-order signals are not
/// rejected: the last write wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayTiming {
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl PlayTiming {
    pub fn new() -> Self {
        Self::default()
    }

    /// A game started at `at`.
    pub fn record_start(&mut self, at: DateTime<Utc>) {
        self.started_at = Some(at);
        self.ended_at = None;
    }

    /// The game ended at `at`.
    ///
    /// If the clock stepped backwards past the start, the end is pinned to
    /// the start so the duration is zero rather than negative.
    pub fn record_end(&mut self, at: DateTime<Utc>) {
        let at = match self.started_at {
            Some(started) if at < started => started,
            _ => at,
        };
        self.ended_at = Some(at);
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Seconds played, at millisecond precision. `0.0` unless both a start
    /// and an end have been recorded.
    pub fn duration_secs(&self) -> f64 {
        match (self.started_at, self.ended_at) {
            (Some(started), Some(ended)) => {
                (ended - started).num_milliseconds() as f64 / 1000.0
            }
            _ => 0.0,
        }
    }
}
