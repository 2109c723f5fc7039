use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::charset::{GlyphRamp, RAMP_STANDARD};
use crate::error::CoreError;
use crate::frame::MAX_STEP;

/// Largeur de repli quand le terminal n'est pas détectable.
pub const DEFAULT_WIDTH: u16 = 80;

/// Cadence par défaut (frames par seconde).
pub const DEFAULT_FPS: u32 = 10;

/// Lecteur audio externe par défaut.
pub const DEFAULT_AUDIO_PLAYER: &str = "ffplay";

/// Output style family, as named in config files and on the command line.
///
/// # Example
/// ```
/// use ta_core::config::StyleKind;
/// assert_eq!("text".parse::<StyleKind>().unwrap(), StyleKind::Text);
/// assert!("sepia".parse::<StyleKind>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StyleKind {
    /// Truecolor escape sequences.
    #[default]
    Color,
    /// Bare glyphs.
    Text,
}

impl FromStr for StyleKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "color" | "colour" => Ok(Self::Color),
            "text" => Ok(Self::Text),
            other => Err(CoreError::Configuration(format!(
                "style inconnu '{other}' (attendu : color, text)"
            ))),
        }
    }
}

/// Color mapping mode.
///
/// # Example
/// ```
/// use ta_core::config::ColorMode;
/// assert_eq!(ColorMode::default(), ColorMode::Full);
/// assert_eq!("greyscale".parse::<ColorMode>().unwrap(), ColorMode::Greyscale);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// RGB direct du pixel source.
    #[default]
    Full,
    /// Canal rouge répliqué sur les trois canaux.
    Greyscale,
}

impl FromStr for ColorMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "greyscale" | "grayscale" => Ok(Self::Greyscale),
            other => Err(CoreError::Configuration(format!(
                "mode couleur inconnu '{other}' (attendu : full, greyscale)"
            ))),
        }
    }
}

/// Closed combination of style, color mode and block rendering.
///
/// Color mode and block rendering only exist for the `Color` style, so an
/// invalid combination cannot be represented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderStyle {
    /// Bare glyphs, no escape sequences.
    Text,
    /// Colored output.
    Color {
        /// How the cell color is derived from the pixel.
        mode: ColorMode,
        /// Paint a background-colored space instead of a colored glyph.
        block: bool,
    },
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self::Color {
            mode: ColorMode::Full,
            block: false,
        }
    }
}

impl RenderStyle {
    /// Combine loose settings into a style.
    ///
    /// # Errors
    /// `Configuration` when `block` is requested with the text style.
    ///
    /// # Example
    /// ```
    /// use ta_core::config::{ColorMode, RenderStyle, StyleKind};
    /// let style = RenderStyle::from_parts(StyleKind::Color, ColorMode::Greyscale, true).unwrap();
    /// assert_eq!(style, RenderStyle::Color { mode: ColorMode::Greyscale, block: true });
    /// assert!(RenderStyle::from_parts(StyleKind::Text, ColorMode::Full, true).is_err());
    /// ```
    pub fn from_parts(kind: StyleKind, mode: ColorMode, block: bool) -> Result<Self, CoreError> {
        match kind {
            StyleKind::Text if block => Err(CoreError::Configuration(
                "color_block n'a de sens qu'avec le style color".into(),
            )),
            StyleKind::Text => Ok(Self::Text),
            StyleKind::Color => Ok(Self::Color { mode, block }),
        }
    }

    /// Inverse de [`RenderStyle::from_parts`]. `Text` reports the default
    /// color mode and no block.
    #[must_use]
    pub fn parts(self) -> (StyleKind, ColorMode, bool) {
        match self {
            Self::Text => (StyleKind::Text, ColorMode::default(), false),
            Self::Color { mode, block } => (StyleKind::Color, mode, block),
        }
    }
}

/// Configuration du rendu d'une image.
///
/// # Example
/// ```
/// use ta_core::config::{RenderConfig, RenderStyle};
/// let config = RenderConfig::new(40, RenderStyle::Text).unwrap();
/// assert_eq!(config.width, 40);
/// assert!(RenderConfig::new(0, RenderStyle::Text).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderConfig {
    /// Nombre de colonnes de sortie (≥ 1).
    pub width: u16,
    /// Style de sortie.
    pub style: RenderStyle,
}

impl RenderConfig {
    /// Build a validated config.
    ///
    /// # Errors
    /// `Configuration` if `width` is zero.
    pub fn new(width: u16, style: RenderStyle) -> Result<Self, CoreError> {
        let config = Self { width, style };
        config.validate()?;
        Ok(config)
    }

    /// Re-check invariants (fields are public).
    ///
    /// # Errors
    /// `Configuration` if `width` is zero.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.width == 0 {
            return Err(CoreError::Configuration("la largeur doit être ≥ 1".into()));
        }
        Ok(())
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            style: RenderStyle::default(),
        }
    }
}

/// What happens to a still-running audio player when playback stops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AudioExit {
    /// Leave the player running (historical behavior).
    #[default]
    Detach,
    /// Kill the player and join its thread.
    Terminate,
}

impl FromStr for AudioExit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detach" => Ok(Self::Detach),
            "terminate" | "kill" => Ok(Self::Terminate),
            other => Err(CoreError::Configuration(format!(
                "politique audio inconnue '{other}' (attendu : detach, terminate)"
            ))),
        }
    }
}

/// Configuration de la lecture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaybackConfig {
    /// Durée d'affichage d'une frame.
    pub step: Duration,
    /// Reprendre au début après la dernière frame.
    pub looping: bool,
    /// Piste audio jouée en parallèle.
    pub audio: Option<PathBuf>,
    /// Diagnostics de synchronisation dans les logs.
    pub debug: bool,
    /// Programme lancé pour jouer l'audio.
    pub audio_player: String,
    /// Politique d'arrêt du lecteur audio.
    pub audio_exit: AudioExit,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            step: step_from_fps(DEFAULT_FPS).unwrap_or(Duration::from_millis(100)),
            looping: false,
            audio: None,
            debug: false,
            audio_player: DEFAULT_AUDIO_PLAYER.to_string(),
            audio_exit: AudioExit::Detach,
        }
    }
}

/// Convert a frame rate into a step duration.
///
/// # Errors
/// `Configuration` if `fps` is zero.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use ta_core::config::step_from_fps;
/// assert_eq!(step_from_fps(4).unwrap(), Duration::from_millis(250));
/// ```
pub fn step_from_fps(fps: u32) -> Result<Duration, CoreError> {
    if fps == 0 {
        return Err(CoreError::Configuration("fps doit être > 0".into()));
    }
    Ok(Duration::from_secs_f64(1.0 / f64::from(fps)))
}

/// Convert a step in seconds into a duration.
///
/// # Errors
/// `Configuration` if `secs` is not a finite positive number or exceeds
/// [`MAX_STEP`].
///
/// # Example
/// ```
/// use std::time::Duration;
/// use ta_core::config::step_from_secs;
/// assert_eq!(step_from_secs(0.5).unwrap(), Duration::from_millis(500));
/// assert!(step_from_secs(1e300).is_err());
/// ```
pub fn step_from_secs(secs: f64) -> Result<Duration, CoreError> {
    let invalid = || {
        CoreError::Configuration(format!(
            "step_secs doit être dans ]0, {}] (reçu {secs})",
            MAX_STEP.as_secs()
        ))
    };
    if !secs.is_finite() || secs <= 0.0 {
        return Err(invalid());
    }
    let step = Duration::try_from_secs_f64(secs).map_err(|_| invalid())?;
    if step.is_zero() || step > MAX_STEP {
        return Err(invalid());
    }
    Ok(step)
}

/// Réglages complets, tels que lus depuis un fichier TOML.
///
/// `width` reste `None` tant qu'aucune valeur explicite n'est fournie ;
/// l'appelant y substitue la largeur du terminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Largeur explicite, sinon largeur du terminal.
    pub width: Option<u16>,
    /// Style de sortie.
    pub style: RenderStyle,
    /// Rampe de glyphes (du plus sombre au plus clair).
    pub ramp: String,
    /// Lecture.
    pub playback: PlaybackConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: None,
            style: RenderStyle::default(),
            ramp: RAMP_STANDARD.to_string(),
            playback: PlaybackConfig::default(),
        }
    }
}

impl Settings {
    /// Resolve the render config, falling back to `detected_width`, then 80.
    ///
    /// # Errors
    /// `Configuration` if the resolved width is zero.
    ///
    /// # Example
    /// ```
    /// use ta_core::config::Settings;
    /// let settings = Settings::default();
    /// assert_eq!(settings.render_config(Some(120)).unwrap().width, 120);
    /// assert_eq!(settings.render_config(None).unwrap().width, 80);
    /// ```
    pub fn render_config(&self, detected_width: Option<u16>) -> Result<RenderConfig, CoreError> {
        let width = self.width.or(detected_width).unwrap_or(DEFAULT_WIDTH);
        RenderConfig::new(width, self.style)
    }

    /// Build the configured glyph ramp.
    ///
    /// # Errors
    /// `Configuration` if the ramp string is empty.
    pub fn glyph_ramp(&self) -> Result<GlyphRamp, CoreError> {
        GlyphRamp::new(&self.ramp)
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize, Default)]
struct ConfigFile {
    render: Option<RenderSection>,
    playback: Option<PlaybackSection>,
}

/// Render section of the TOML config, all fields optional for partial override.
#[derive(Deserialize, Default)]
struct RenderSection {
    width: Option<u16>,
    style: Option<String>,
    color: Option<String>,
    color_block: Option<bool>,
    ramp: Option<String>,
}

/// Playback section of the TOML config, all fields optional.
#[derive(Deserialize, Default)]
struct PlaybackSection {
    fps: Option<u32>,
    step_secs: Option<f64>,
    #[serde(rename = "loop")]
    looping: Option<bool>,
    audio: Option<PathBuf>,
    debug: Option<bool>,
    audio_player: Option<String>,
    audio_on_stop: Option<String>,
}

/// Parse un document TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the TOML is malformed or a value is invalid; invalid
/// values carry a [`CoreError::Configuration`].
///
/// # Example
/// ```
/// use ta_core::config::{parse_config, RenderStyle};
/// let settings = parse_config("[render]\nstyle = \"text\"\nwidth = 42\n").unwrap();
/// assert_eq!(settings.style, RenderStyle::Text);
/// assert_eq!(settings.width, Some(42));
/// ```
pub fn parse_config(content: &str) -> Result<Settings> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;
    let mut settings = Settings::default();

    let r = file.render.unwrap_or_default();
    if let Some(v) = r.width {
        settings.width = Some(v);
    }
    let kind = r.style.as_deref().map(str::parse::<StyleKind>).transpose()?;
    let mode = r.color.as_deref().map(str::parse::<ColorMode>).transpose()?;
    settings.style = RenderStyle::from_parts(
        kind.unwrap_or_default(),
        mode.unwrap_or_default(),
        r.color_block.unwrap_or(false),
    )?;
    if let Some(v) = r.ramp {
        GlyphRamp::new(&v)?;
        settings.ramp = v;
    }
    if let Some(width) = settings.width {
        RenderConfig::new(width, settings.style)?;
    }

    let p = file.playback.unwrap_or_default();
    if let Some(secs) = p.step_secs {
        if p.fps.is_some() {
            log::warn!("fps et step_secs fournis ensemble : step_secs est prioritaire.");
        }
        settings.playback.step = step_from_secs(secs)?;
    } else if let Some(fps) = p.fps {
        settings.playback.step = step_from_fps(fps)?;
    }
    if let Some(v) = p.looping {
        settings.playback.looping = v;
    }
    if let Some(v) = p.audio {
        settings.playback.audio = Some(v);
    }
    if let Some(v) = p.debug {
        settings.playback.debug = v;
    }
    if let Some(v) = p.audio_player {
        settings.playback.audio_player = v;
    }
    if let Some(v) = p.audio_on_stop {
        settings.playback.audio_exit = v.parse()?;
    }

    Ok(settings)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use ta_core::config::load_config;
/// use std::path::Path;
/// let settings = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Configuration invalide dans {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn config_error(err: &anyhow::Error) -> bool {
        err.chain()
            .filter_map(|e| e.downcast_ref::<CoreError>())
            .any(CoreError::is_configuration)
    }

    #[test]
    fn empty_document_yields_defaults() {
        let settings = parse_config("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.playback.step, Duration::from_millis(100));
        assert_eq!(settings.playback.audio_player, "ffplay");
    }

    #[test]
    fn full_document_is_merged() {
        let settings = parse_config(
            r#"
            [render]
            width = 64
            style = "color"
            color = "greyscale"
            color_block = true
            ramp = " .#"

            [playback]
            fps = 25
            loop = true
            audio = "track.mp3"
            debug = true
            audio_player = "mpv"
            audio_on_stop = "terminate"
            "#,
        )
        .unwrap();
        assert_eq!(settings.width, Some(64));
        assert_eq!(
            settings.style,
            RenderStyle::Color {
                mode: ColorMode::Greyscale,
                block: true
            }
        );
        assert_eq!(settings.glyph_ramp().unwrap().len(), 3);
        assert_eq!(settings.playback.step, Duration::from_millis(40));
        assert!(settings.playback.looping);
        assert_eq!(settings.playback.audio, Some(PathBuf::from("track.mp3")));
        assert!(settings.playback.debug);
        assert_eq!(settings.playback.audio_player, "mpv");
        assert_eq!(settings.playback.audio_exit, AudioExit::Terminate);
    }

    #[test]
    fn step_secs_wins_over_fps() {
        let settings = parse_config("[playback]\nfps = 10\nstep_secs = 0.5\n").unwrap();
        assert_eq!(settings.playback.step, Duration::from_millis(500));
    }

    #[test]
    fn unknown_style_is_a_configuration_error() {
        let err = parse_config("[render]\nstyle = \"sepia\"\n").unwrap_err();
        assert!(config_error(&err));
    }

    #[test]
    fn text_with_color_block_is_rejected() {
        let err = parse_config("[render]\nstyle = \"text\"\ncolor_block = true\n").unwrap_err();
        assert!(config_error(&err));
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        assert!(config_error(&parse_config("[render]\nwidth = 0\n").unwrap_err()));
        assert!(config_error(&parse_config("[playback]\nfps = 0\n").unwrap_err()));
        assert!(config_error(
            &parse_config("[playback]\nstep_secs = -1.0\n").unwrap_err()
        ));
        assert!(config_error(&parse_config("[render]\nramp = \"\"\n").unwrap_err()));
    }

    #[test]
    fn oversized_steps_are_rejected_without_panicking() {
        for doc in [
            "[playback]\nstep_secs = 1e300\n",
            "[playback]\nstep_secs = 1e19\n",
            "[playback]\nstep_secs = 3601.0\n",
        ] {
            assert!(config_error(&parse_config(doc).unwrap_err()), "{doc}");
        }
        assert_eq!(step_from_secs(3600.0).unwrap(), MAX_STEP);
        // Sous la nanoseconde : arrondi à zéro, donc refusé.
        assert!(step_from_secs(1e-12).is_err());
    }

    #[test]
    fn load_config_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[render]\nwidth = 33").unwrap();
        let settings = load_config(file.path()).unwrap();
        assert_eq!(settings.width, Some(33));
    }

    #[test]
    fn load_config_reports_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("Impossible de lire"));
    }
}
