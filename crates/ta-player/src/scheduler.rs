use std::sync::Arc;
use std::time::{Duration, Instant};

use ta_core::clock::MediaClock;
use ta_core::config::{AudioExit, DEFAULT_AUDIO_PLAYER, PlaybackConfig};
use ta_core::frame::FrameSequence;
use ta_render::Screen;

use crate::audio::AudioTask;
use crate::drift::{Drift, next_index};
use crate::error::PlaybackError;
use crate::stop::StopToken;

/// Cycle de vie du planificateur.
///
/// `Idle → Initializing → Running → Stopping → Idle`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayerState {
    #[default]
    Idle,
    /// Terminal en cours de préparation.
    Initializing,
    Running,
    /// Restauration du terminal et sort de l'audio.
    Stopping,
}

/// Why the render loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// Non-loop playback ran past the sequence's total duration.
    Completed,
    /// A stop was requested through the [`StopToken`].
    Interrupted,
}

/// Résumé d'une lecture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackReport {
    /// Frames written to the screen.
    pub frames_shown: u64,
    /// Wall time spent in the render loop.
    pub elapsed: Duration,
    /// Cause de l'arrêt.
    pub reason: StopReason,
}

/// Scheduler settings not carried by the [`FrameSequence`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedulerOptions {
    /// Diagnostics de synchronisation (niveau debug).
    pub debug: bool,
    /// Programme lecteur audio.
    pub audio_player: String,
    /// Fate of a still-running audio player when playback stops.
    pub audio_exit: AudioExit,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            debug: false,
            audio_player: DEFAULT_AUDIO_PLAYER.to_string(),
            audio_exit: AudioExit::Detach,
        }
    }
}

impl From<&PlaybackConfig> for SchedulerOptions {
    fn from(config: &PlaybackConfig) -> Self {
        Self {
            debug: config.debug,
            audio_player: config.audio_player.clone(),
            audio_exit: config.audio_exit,
        }
    }
}

/// Prépare le terminal et le restaure exactement une fois.
///
/// Setup clears the scrollback, enters the alternate buffer, hides the
/// cursor and clears the screen. Restoration runs on drop, whatever the
/// exit path.
struct ScreenGuard<'a, S: Screen> {
    screen: &'a mut S,
    restored: bool,
}

impl<'a, S: Screen> ScreenGuard<'a, S> {
    fn acquire(screen: &'a mut S) -> Self {
        screen.clear_scrollback();
        screen.enter_alt_buffer();
        screen.hide_cursor();
        screen.clear_screen();
        Self {
            screen,
            restored: false,
        }
    }

    fn screen(&mut self) -> &mut S {
        &mut *self.screen
    }

    fn restore(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        self.screen.exit_alt_buffer();
        self.screen.clear_screen();
        self.screen.show_cursor();
        let _ = self.screen.flush();
    }
}

impl<S: Screen> Drop for ScreenGuard<'_, S> {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Joue une séquence de frames sur un écran, calée sur l'audio.
///
/// Each iteration moves the cursor home, writes the current frame, clears
/// the rest of the screen, flushes, then sleeps exactly one step. Drift
/// against the media clock only decides which frame comes next.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use ta_core::frame::{Frame, FrameSequence};
/// use ta_player::{PlaybackScheduler, SchedulerOptions, StopReason};
/// use ta_render::AnsiScreen;
///
/// let seq = FrameSequence::new(vec![Frame::new("a\n"), Frame::new("b\n")], Duration::from_millis(5)).unwrap();
/// let mut player = PlaybackScheduler::new(seq, AnsiScreen::new(Vec::new()), SchedulerOptions::default());
/// let report = player.play().unwrap();
/// assert_eq!(report.reason, StopReason::Completed);
/// ```
pub struct PlaybackScheduler<S: Screen> {
    sequence: FrameSequence,
    screen: S,
    options: SchedulerOptions,
    token: StopToken,
    state: PlayerState,
}

impl<S: Screen> PlaybackScheduler<S> {
    /// Scheduler with a fresh [`StopToken`].
    pub fn new(sequence: FrameSequence, screen: S, options: SchedulerOptions) -> Self {
        Self::with_token(sequence, screen, options, StopToken::new())
    }

    /// Scheduler observing an existing token (e.g. one wired to Ctrl+C).
    pub fn with_token(
        sequence: FrameSequence,
        screen: S,
        options: SchedulerOptions,
        token: StopToken,
    ) -> Self {
        Self {
            sequence,
            screen,
            options,
            token,
            state: PlayerState::Idle,
        }
    }

    /// Request termination at the next check. Pending sleeps are cut short.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Handle for stopping playback from another thread.
    #[must_use]
    pub fn stop_token(&self) -> StopToken {
        self.token.clone()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Borrow the screen.
    pub fn screen(&self) -> &S {
        &self.screen
    }

    /// Unwrap the screen.
    pub fn into_screen(self) -> S {
        self.screen
    }

    /// Run playback until completion or a stop request. Blocking.
    ///
    /// The terminal is restored before this returns, errors included.
    ///
    /// # Errors
    /// `Io` if writing or flushing a frame fails.
    pub fn play(&mut self) -> Result<PlaybackReport, PlaybackError> {
        self.state = PlayerState::Initializing;
        let started = Instant::now();
        let clock = Arc::new(MediaClock::new());

        let audio = match self.sequence.audio() {
            Some(asset) => match AudioTask::spawn(
                &self.options.audio_player,
                asset,
                self.sequence.is_looping(),
                Arc::clone(&clock),
                self.options.debug,
            ) {
                Ok(task) => Some(task),
                Err(e) => {
                    if self.options.debug {
                        log::debug!("audio: {e}");
                    }
                    clock.mark_started_at(started);
                    None
                }
            },
            None => {
                clock.mark_started_at(started);
                None
            }
        };

        let result = self.run(&clock, started);
        self.state = PlayerState::Stopping;

        if let Some(task) = audio {
            match self.options.audio_exit {
                AudioExit::Detach => task.detach(),
                AudioExit::Terminate => {
                    if let Some(e) = task.terminate().err().filter(|_| self.options.debug) {
                        log::debug!("{e}");
                    }
                }
            }
        }

        self.state = PlayerState::Idle;
        match &result {
            Ok(report) => log::info!(
                "lecture terminée ({:?}) : {} frames en {:.2}s",
                report.reason,
                report.frames_shown,
                report.elapsed.as_secs_f64()
            ),
            Err(e) => log::warn!("lecture interrompue par une erreur : {e}"),
        }
        result
    }

    fn run(
        &mut self,
        clock: &MediaClock,
        started: Instant,
    ) -> Result<PlaybackReport, PlaybackError> {
        let step = self.sequence.step();
        let total = self.sequence.total_duration();
        let looping = self.sequence.is_looping();
        let count = self.sequence.len();
        let debug = self.options.debug;

        let mut guard = ScreenGuard::acquire(&mut self.screen);
        self.state = PlayerState::Running;

        let mut index = 0usize;
        let mut frames_shown = 0u64;

        let reason = loop {
            if self.token.is_cancelled() {
                break StopReason::Interrupted;
            }

            let screen = guard.screen();
            screen.cursor_home();
            screen.write_frame(self.sequence.frame(index))?;
            screen.clear_from_cursor();
            screen.flush()?;
            frames_shown += 1;

            if self.token.sleep(step) {
                break StopReason::Interrupted;
            }

            let actual = clock.elapsed_or(started).as_secs_f64();
            let expected = step.as_secs_f64() * index as f64;
            let drift = Drift::classify(actual - expected, step);
            if debug {
                log::debug!(
                    "sync: réel {actual:.3}s, frame {expected:.3}s, index {index}/{count}, {drift:?}"
                );
                if let Drift::Behind { catch_up } = drift {
                    log::debug!("sync: retard de {catch_up} frames, non rattrapé");
                }
            }
            index = next_index(index, drift.increment(), count);

            // Même base de temps que la dérive : l'ancre audio si posée.
            if !looping && clock.elapsed_or(started) > total {
                break StopReason::Completed;
            }
        };

        self.state = PlayerState::Stopping;
        guard.restore();
        Ok(PlaybackReport {
            frames_shown,
            elapsed: started.elapsed(),
            reason,
        })
    }
}
