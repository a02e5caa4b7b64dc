//! When is the game runtime ready to accept listeners?

use std::time::Duration;

use tokio::sync::oneshot;

/// How long to wait for the game runtime when it can't tell us it's ready.
pub const DEFAULT_STARTUP_DELAY: Duration = Duration::from_secs(1);

/// Gate the observer waits on before loading the game's core module.
///
/// Prefer [`Readiness::channel`]: the runtime calls
/// [`ReadyNotifier::notify`] once it has booted. [`Readiness::Delay`] is a
/// best-effort guess for runtimes that can't do that; if the runtime is
/// still booting when it elapses, the core module load fails and no hooks
/// are attached.
#[derive(Debug)]
pub enum Readiness {
    /// Proceed at once.
    Immediate,
    /// Proceed after a fixed delay.
    Delay(Duration),
    /// Proceed when the paired [`ReadyNotifier`] fires. If the notifier is
    /// dropped without firing, the runtime never became ready.
    Signal(oneshot::Receiver<()>),
}

impl Default for Readiness {
    fn default() -> Self {
        Self::Delay(DEFAULT_STARTUP_DELAY)
    }
}

impl Readiness {
    /// Creates a signal-based gate and the notifier that opens it.
    pub fn channel() -> (ReadyNotifier, Self) {
        let (tx, rx) = oneshot::channel();
        (ReadyNotifier(tx), Self::Signal(rx))
    }

    /// Waits for the gate. Returns `false` if readiness will never come.
    pub async fn wait(self) -> bool {
        match self {
            Self::Immediate => true,
            Self::Delay(delay) => {
                tokio::time::sleep(delay).await;
                true
            }
            Self::Signal(rx) => rx.await.is_ok(),
        }
    }
}

/// The runtime's half of [`Readiness::Signal`].
#[derive(Debug)]
pub struct ReadyNotifier(oneshot::Sender<()>);

impl ReadyNotifier {
    /// Announces that the game runtime has booted.
    pub fn notify(self) {
        // The observer may already be gone; nothing to do then.
        let _ = self.0.send(());
    }
}
