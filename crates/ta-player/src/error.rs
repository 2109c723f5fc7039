use thiserror::Error;

/// Errors raised by playback.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// Writing a frame to the output failed.
    #[error("Sortie terminal : {0}")]
    Io(#[from] std::io::Error),

    /// The audio task could not be started or stopped.
    #[error("Audio : {0}")]
    Audio(String),
}
