/// Audio-synced playback of frame sequences for termascii.
///
/// The scheduler drives a [`ta_render::Screen`] at a fixed step, corrects
/// drift against the audio start anchor and restores the terminal on every
/// exit path.

pub mod audio;
pub mod drift;
pub mod error;
pub mod scheduler;
pub mod stop;

pub use error::PlaybackError;
pub use scheduler::{PlaybackReport, PlaybackScheduler, PlayerState, SchedulerOptions, StopReason};
pub use stop::{StopToken, install_interrupt_handler};
