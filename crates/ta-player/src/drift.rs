use std::time::Duration;

/// Retard (s) au-delà duquel la vidéo est considérée derrière l'audio.
pub const SLOW_DELTA: f64 = 0.9;

/// Avance (s) au-delà de laquelle la vidéo attend l'audio.
pub const FAST_DELTA: f64 = 0.2;

/// Position of the video relative to the media clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Drift {
    /// Within `[-FAST_DELTA, SLOW_DELTA]`.
    OnTime,
    /// More than `SLOW_DELTA` behind; `catch_up` frames would close the gap.
    Behind {
        /// `floor(offset / step)`.
        catch_up: u64,
    },
    /// More than `FAST_DELTA` ahead.
    Ahead,
}

impl Drift {
    /// Classify `offset_secs = actual - expected` elapsed time.
    ///
    /// Both thresholds are strict, so `0.9` and `-0.2` are on time.
    ///
    /// # Example
    /// ```
    /// use ta_player::drift::Drift;
    /// use std::time::Duration;
    /// let step = Duration::from_millis(100);
    /// assert_eq!(Drift::classify(0.9, step), Drift::OnTime);
    /// assert_eq!(Drift::classify(-0.2, step), Drift::OnTime);
    /// assert_eq!(Drift::classify(-0.3, step), Drift::Ahead);
    /// assert!(matches!(Drift::classify(1.25, step), Drift::Behind { catch_up: 12 }));
    /// ```
    #[must_use]
    pub fn classify(offset_secs: f64, step: Duration) -> Self {
        if offset_secs > SLOW_DELTA {
            let step_secs = step.as_secs_f64();
            let catch_up = if step_secs > 0.0 {
                (offset_secs / step_secs).floor() as u64
            } else {
                0
            };
            Self::Behind { catch_up }
        } else if offset_secs < -FAST_DELTA {
            Self::Ahead
        } else {
            Self::OnTime
        }
    }

    /// Frame index increment for this iteration.
    ///
    /// `Behind` advances by one like `OnTime`: the catch-up amount is only
    /// reported, never applied.
    #[inline]
    #[must_use]
    pub fn increment(self) -> usize {
        match self {
            Self::OnTime | Self::Behind { .. } => 1,
            Self::Ahead => 0,
        }
    }
}

/// `(index + increment) mod count`, with `count == 0` pinned to 0.
///
/// # Example
/// ```
/// use ta_player::drift::next_index;
/// assert_eq!(next_index(4, 1, 5), 0);
/// assert_eq!(next_index(2, 0, 5), 2);
/// ```
#[inline]
#[must_use]
pub fn next_index(index: usize, increment: usize, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    (index + increment) % count
}
