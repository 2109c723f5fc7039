use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use ta_core::clock::MediaClock;

use crate::error::PlaybackError;

/// Intervalle de sondage du processus lecteur.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Arguments passed to the player before the asset path.
///
/// # Example
/// ```
/// use ta_player::audio::player_args;
/// assert_eq!(player_args(false), ["-nodisp", "-autoexit", "-loglevel", "quiet"]);
/// assert_eq!(player_args(true).last(), Some(&"0"));
/// ```
#[must_use]
pub fn player_args(looping: bool) -> Vec<&'static str> {
    let mut args = vec!["-nodisp", "-autoexit", "-loglevel", "quiet"];
    if looping {
        args.extend(["-loop", "0"]);
    }
    args
}

#[derive(Default)]
struct Slot {
    child: Option<Child>,
    cancelled: bool,
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Lecteur audio externe piloté depuis un thread dédié.
///
/// The thread spawns the player once, anchors the [`MediaClock`] when the
/// process is up, then waits for it to exit. Failures are never reported
/// to the render loop; they are logged when `debug` is set.
pub struct AudioTask {
    slot: Arc<Mutex<Slot>>,
    handle: Option<JoinHandle<()>>,
}

impl AudioTask {
    /// Start `player` on `asset` in a background thread.
    ///
    /// # Errors
    /// `Audio` if the thread cannot be created. Failing to launch the player
    /// itself is not an error here.
    pub fn spawn(
        player: &str,
        asset: &Path,
        looping: bool,
        clock: Arc<MediaClock>,
        debug: bool,
    ) -> Result<Self, PlaybackError> {
        let slot = Arc::new(Mutex::new(Slot::default()));
        let thread_slot = Arc::clone(&slot);
        let player = player.to_string();
        let asset = asset.to_path_buf();

        let handle = thread::Builder::new()
            .name("ta-audio".into())
            .spawn(move || run_player(&player, &asset, looping, &clock, &thread_slot, debug))
            .map_err(|e| PlaybackError::Audio(format!("thread audio impossible : {e}")))?;

        Ok(Self {
            slot,
            handle: Some(handle),
        })
    }

    /// `true` once the player thread has returned.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Kill the player if it is still running, then join the thread.
    ///
    /// # Errors
    /// `Audio` if the player thread panicked.
    pub fn terminate(mut self) -> Result<(), PlaybackError> {
        let child = {
            let mut slot = lock(&self.slot);
            slot.cancelled = true;
            slot.child.take()
        };
        if let Some(mut child) = child {
            // Le processus peut être sorti entre-temps.
            if let Err(e) = child.kill() {
                log::debug!("audio: kill ignoré : {e}");
            }
            let _ = child.wait();
            log::debug!("audio: lecteur arrêté");
        }
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| PlaybackError::Audio("thread audio paniqué".into()))?;
        }
        Ok(())
    }

    /// Let the player run to completion on its own.
    pub fn detach(mut self) {
        if !self.is_finished() {
            log::debug!("audio: lecteur détaché");
        }
        drop(self.handle.take());
    }
}

fn run_player(
    player: &str,
    asset: &Path,
    looping: bool,
    clock: &MediaClock,
    slot: &Mutex<Slot>,
    debug: bool,
) {
    let started = Instant::now();
    let spawned = Command::new(player)
        .args(player_args(looping))
        .arg("-i")
        .arg(asset)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            if debug {
                log::debug!("audio: impossible de lancer {player} : {e}");
            }
            return;
        }
    };

    {
        let mut guard = lock(slot);
        if guard.cancelled {
            let _ = child.kill();
            let _ = child.wait();
            return;
        }
        clock.mark_started();
        guard.child = Some(child);
    }

    loop {
        let status = {
            let mut guard = lock(slot);
            match guard.child.as_mut() {
                Some(child) => child.try_wait(),
                // Repris par terminate().
                None => return,
            }
        };
        match status {
            Ok(Some(status)) => {
                lock(slot).child = None;
                if debug {
                    log::debug!(
                        "audio: {} joué en {:.2}s ({status})",
                        asset.display(),
                        started.elapsed().as_secs_f64()
                    );
                }
                return;
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                if debug {
                    log::debug!("audio: attente du lecteur impossible : {e}");
                }
                return;
            }
        }
    }
}
