//! In-process host implementation.
//!
//! Every type here is a cheap, cloneable handle over shared state, so a
//! test (or a headless embedder) can give one clone to the bridge and keep
//! another to drive and inspect the "browser" side:
//!
//! - [`MemoryWindow`] records alerts and close requests.
//! - [`MemoryOpener`] collects posted messages and can be closed.
//! - [`MemoryLoader`] serves a [`MemoryMediator`] and the current score,
//!   and can be told to fail either load.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use gamelink_protocol::Score;

use crate::{
    CoreModule, DashboardModule, HostError, HostWindow, Listener, Mediator,
    ModuleLoader, Opener, CORE_MODULE, DASHBOARD_MODULE,
};

/// Locks a mutex, recovering the data if a previous holder panicked.
/// A panicking test listener shouldn't take the whole host down with it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Opener
// ---------------------------------------------------------------------------

/// A message the game posted to its opener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub data: Vec<u8>,
    pub target_origin: String,
}

#[derive(Debug, Default)]
struct OpenerInner {
    closed: AtomicBool,
    reject_posts: AtomicBool,
    outbox: Mutex<Vec<PostedMessage>>,
}

/// An opener window that keeps everything posted to it.
#[derive(Debug, Clone, Default)]
pub struct MemoryOpener {
    inner: Arc<OpenerInner>,
}

impl MemoryOpener {
    /// Creates an open opener with an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the user closing the launching tab.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
    }

    /// Makes subsequent posts fail with [`HostError::PostFailed`].
    pub fn reject_posts(&self, reject: bool) {
        self.inner.reject_posts.store(reject, Ordering::SeqCst);
    }

    /// A copy of every message posted so far, oldest first.
    pub fn messages(&self) -> Vec<PostedMessage> {
        lock(&self.inner.outbox).clone()
    }

    /// Drains the outbox.
    pub fn take_messages(&self) -> Vec<PostedMessage> {
        std::mem::take(&mut *lock(&self.inner.outbox))
    }
}

impl Opener for MemoryOpener {
    fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    fn post_message(
        &self,
        data: &[u8],
        target_origin: &str,
    ) -> Result<(), HostError> {
        if self.inner.reject_posts.load(Ordering::SeqCst) {
            return Err(HostError::PostFailed("opener rejected message".into()));
        }
        tracing::trace!(bytes = data.len(), target_origin, "message posted to opener");
        lock(&self.inner.outbox).push(PostedMessage {
            data: data.to_vec(),
            target_origin: target_origin.to_string(),
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct WindowInner {
    opener: Option<MemoryOpener>,
    alerts: Mutex<Vec<String>>,
    close_requests: AtomicUsize,
}

/// The embedded game's own window.
#[derive(Debug, Clone, Default)]
pub struct MemoryWindow {
    inner: Arc<WindowInner>,
}

impl MemoryWindow {
    /// A window opened by `opener`.
    pub fn with_opener(opener: MemoryOpener) -> Self {
        Self {
            inner: Arc::new(WindowInner {
                opener: Some(opener),
                ..WindowInner::default()
            }),
        }
    }

    /// A window nobody opened (loaded directly, or the opener reference was
    /// severed).
    pub fn orphan() -> Self {
        Self::default()
    }

    /// Every alert shown so far, oldest first.
    pub fn alerts(&self) -> Vec<String> {
        lock(&self.inner.alerts).clone()
    }

    /// How many times the game asked to close this window.
    pub fn close_requests(&self) -> usize {
        self.inner.close_requests.load(Ordering::SeqCst)
    }
}

impl HostWindow for MemoryWindow {
    type Opener = MemoryOpener;

    fn opener(&self) -> Option<&MemoryOpener> {
        self.inner.opener.as_ref()
    }

    fn alert(&self, message: &str) {
        lock(&self.inner.alerts).push(message.to_string());
    }

    fn close(&self) {
        self.inner.close_requests.fetch_add(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Game runtime
// ---------------------------------------------------------------------------

/// An event bus the test drives by calling [`emit`](Self::emit).
#[derive(Clone, Default)]
pub struct MemoryMediator {
    listeners: Arc<Mutex<HashMap<String, Vec<Listener>>>>,
}

impl MemoryMediator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires `event`, calling each registered listener in registration
    /// order. Returns how many listeners ran.
    pub fn emit(&self, event: &str) -> usize {
        // Clone the list out so listeners can register more listeners
        // without deadlocking.
        let listeners = lock(&self.listeners)
            .get(event)
            .cloned()
            .unwrap_or_default();
        for listener in &listeners {
            listener();
        }
        listeners.len()
    }

    /// Number of listeners registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        lock(&self.listeners).get(event).map_or(0, Vec::len)
    }
}

impl Mediator for MemoryMediator {
    fn add_listener(&self, event: &str, listener: Listener) {
        lock(&self.listeners)
            .entry(event.to_string())
            .or_default()
            .push(listener);
    }
}

/// The core module served by [`MemoryLoader`].
#[derive(Clone)]
pub struct MemoryCore {
    mediator: MemoryMediator,
}

impl CoreModule for MemoryCore {
    type Mediator = MemoryMediator;

    fn mediator(&self) -> &MemoryMediator {
        &self.mediator
    }
}

/// The dashboard module served by [`MemoryLoader`]. Holds the score as it
/// was when the module was loaded.
#[derive(Debug, Clone, Copy)]
pub struct MemoryDashboard {
    score: Score,
}

impl DashboardModule for MemoryDashboard {
    fn score(&self) -> Score {
        self.score
    }
}

struct LoaderInner {
    mediator: MemoryMediator,
    score: Mutex<Score>,
    core_available: AtomicBool,
    dashboard_available: AtomicBool,
}

/// A module loader for a game runtime that lives in the same process.
#[derive(Clone)]
pub struct MemoryLoader {
    inner: Arc<LoaderInner>,
}

impl Default for MemoryLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLoader {
    /// A loader with both modules available and a score of zero.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                mediator: MemoryMediator::new(),
                score: Mutex::new(Score::default()),
                core_available: AtomicBool::new(true),
                dashboard_available: AtomicBool::new(true),
            }),
        }
    }

    /// The mediator handed out with the core module.
    pub fn mediator(&self) -> &MemoryMediator {
        &self.inner.mediator
    }

    /// Sets the score the dashboard reports from now on.
    pub fn set_score(&self, score: impl Into<Score>) {
        *lock(&self.inner.score) = score.into();
    }

    /// Makes [`load_core`](ModuleLoader::load_core) fail while `false`.
    pub fn set_core_available(&self, available: bool) {
        self.inner.core_available.store(available, Ordering::SeqCst);
    }

    /// Makes [`load_dashboard`](ModuleLoader::load_dashboard) fail while
    /// `false`.
    pub fn set_dashboard_available(&self, available: bool) {
        self.inner.dashboard_available.store(available, Ordering::SeqCst);
    }
}

impl ModuleLoader for MemoryLoader {
    type Core = MemoryCore;
    type Dashboard = MemoryDashboard;

    async fn load_core(&self) -> Result<MemoryCore, HostError> {
        if !self.inner.core_available.load(Ordering::SeqCst) {
            return Err(HostError::ModuleUnavailable(CORE_MODULE.into()));
        }
        Ok(MemoryCore {
            mediator: self.inner.mediator.clone(),
        })
    }

    async fn load_dashboard(&self) -> Result<MemoryDashboard, HostError> {
        if !self.inner.dashboard_available.load(Ordering::SeqCst) {
            return Err(HostError::ModuleUnavailable(DASHBOARD_MODULE.into()));
        }
        Ok(MemoryDashboard {
            score: *lock(&self.inner.score),
        })
    }
}
