use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Horloge partagée pour la synchronisation A/V.
///
/// L'audio est le maître : le thread audio fixe l'instant de départ dès que
/// le lecteur est effectivement lancé. Le thread de rendu lit cet instant
/// pour caler ses frames. Sans audio, le planificateur fixe lui-même le
/// départ.
///
/// The anchor is written at most once; later writes are ignored.
///
/// # Example
/// ```
/// use ta_core::clock::MediaClock;
/// let clock = MediaClock::new();
/// assert!(!clock.is_started());
/// assert!(clock.mark_started());
/// assert!(!clock.mark_started());
/// assert!(clock.is_started());
/// ```
#[derive(Debug, Default)]
pub struct MediaClock {
    started_at: OnceLock<Instant>,
}

impl MediaClock {
    /// Horloge non démarrée.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixe le départ à maintenant. Retourne `false` s'il était déjà fixé.
    pub fn mark_started(&self) -> bool {
        self.mark_started_at(Instant::now())
    }

    /// Fixe le départ à `at`. Retourne `false` s'il était déjà fixé.
    pub fn mark_started_at(&self, at: Instant) -> bool {
        self.started_at.set(at).is_ok()
    }

    /// `true` une fois le départ fixé.
    #[inline]
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started_at.get().is_some()
    }

    /// Instant de départ, s'il est fixé.
    #[inline]
    #[must_use]
    pub fn started_at(&self) -> Option<Instant> {
        self.started_at.get().copied()
    }

    /// Temps écoulé depuis le départ, ou depuis `fallback` tant que le
    /// départ n'est pas fixé.
    #[inline]
    #[must_use]
    pub fn elapsed_or(&self, fallback: Instant) -> Duration {
        self.started_at().unwrap_or(fallback).elapsed()
    }
}
