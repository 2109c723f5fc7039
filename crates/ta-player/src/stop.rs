use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use flume::{Receiver, Sender};

/// Jeton d'annulation partagé entre le planificateur et ses déclencheurs.
///
/// Cancellation is sticky: once set, every clone reports it and every
/// [`StopToken::sleep`] returns immediately.
///
/// # Example
/// ```
/// use ta_player::StopToken;
/// use std::time::Duration;
/// let token = StopToken::new();
/// let remote = token.clone();
/// remote.cancel();
/// assert!(token.is_cancelled());
/// assert!(token.sleep(Duration::from_secs(10)));
/// ```
#[derive(Clone, Debug)]
pub struct StopToken {
    cancelled: Arc<AtomicBool>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
}

impl StopToken {
    /// Jeton non annulé.
    #[must_use]
    pub fn new() -> Self {
        let (wake_tx, wake_rx) = flume::bounded(1);
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            wake_tx,
            wake_rx,
        }
    }

    /// Request a stop and wake any pending sleep.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        // Canal plein = un réveil est déjà en attente.
        let _ = self.wake_tx.try_send(());
    }

    /// `true` once [`StopToken::cancel`] has been called.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Sleep for `duration` unless cancelled first.
    ///
    /// Returns `true` if the token is cancelled when the sleep ends.
    pub fn sleep(&self, duration: Duration) -> bool {
        if self.is_cancelled() {
            return true;
        }
        // Timeout : sommeil complet. Réveil : le drapeau tranche.
        match Instant::now().checked_add(duration) {
            Some(deadline) => {
                let _ = self.wake_rx.recv_deadline(deadline);
            }
            // Échéance hors de portée d'Instant : attendre l'annulation.
            None => {
                let _ = self.wake_rx.recv();
            }
        }
        self.is_cancelled()
    }
}

impl Default for StopToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Route Ctrl+C (SIGINT/SIGTERM) to `token`.
///
/// Only one handler may be installed per process.
///
/// # Errors
/// Returns the `ctrlc` error if a handler is already installed or the
/// platform hook fails.
pub fn install_interrupt_handler(token: &StopToken) -> Result<(), ctrlc::Error> {
    let token = token.clone();
    ctrlc::set_handler(move || {
        log::info!("interruption reçue, arrêt demandé");
        token.cancel();
    })
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn sleep_runs_full_duration_when_not_cancelled() {
        let token = StopToken::new();
        let start = Instant::now();
        assert!(!token.sleep(Duration::from_millis(30)));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn cancel_preempts_a_pending_sleep() {
        let token = StopToken::new();
        let remote = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });
        let start = Instant::now();
        assert!(token.sleep(Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_secs(5));
        handle.join().unwrap();
    }

    #[test]
    fn unbounded_sleep_still_wakes_on_cancel() {
        let token = StopToken::new();
        let remote = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });
        assert!(token.sleep(Duration::from_secs(u64::MAX / 2)));
        assert!(token.sleep(Duration::MAX));
        handle.join().unwrap();
    }

    #[test]
    fn cancellation_is_sticky() {
        let token = StopToken::new();
        token.cancel();
        token.cancel();
        assert!(token.sleep(Duration::from_secs(10)));
        assert!(token.sleep(Duration::from_secs(10)));
        assert!(token.clone().is_cancelled());
    }
}
