use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;
use ta_ascii::FrameGenerator;
use ta_core::config::{
    self, ColorMode, PlaybackConfig, RenderStyle, Settings, StyleKind, step_from_fps,
    step_from_secs,
};
use ta_core::frame::{Frame, FrameSequence};

use crate::cli::Cli;

/// Charge la config (fichier ou défauts) puis applique les overrides CLI.
///
/// # Errors
/// Returns an error if the config file is invalid or a CLI value is
/// rejected.
pub fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        Settings::default()
    };

    if let Some(width) = cli.width {
        settings.width = Some(width);
    }

    let (mut kind, mut mode, mut block) = settings.style.parts();
    if let Some(ref s) = cli.style {
        kind = s.parse::<StyleKind>()?;
    }
    if let Some(ref c) = cli.color {
        mode = c.parse::<ColorMode>()?;
    }
    if cli.color_block {
        block = true;
    }
    settings.style = RenderStyle::from_parts(kind, mode, block)?;

    apply_playback_overrides(cli, &mut settings.playback)?;
    Ok(settings)
}

fn apply_playback_overrides(cli: &Cli, playback: &mut PlaybackConfig) -> Result<()> {
    if let Some(secs) = cli.step_secs {
        playback.step = step_from_secs(secs)?;
    } else if let Some(fps) = cli.fps {
        playback.step = step_from_fps(fps)?;
    }
    if cli.looping {
        playback.looping = true;
    }
    if let Some(ref audio) = cli.audio {
        playback.audio = Some(audio.clone());
    }
    if let Some(ref player) = cli.audio_player {
        playback.audio_player.clone_from(player);
    }
    if let Some(ref policy) = cli.audio_on_stop {
        playback.audio_exit = policy.parse()?;
    }
    if cli.debug {
        playback.debug = true;
    }
    Ok(())
}

/// Build the frame generator for the resolved settings.
///
/// # Errors
/// Returns an error if the width or the glyph ramp is invalid.
pub fn build_generator(settings: &Settings, detected_width: Option<u16>) -> Result<FrameGenerator> {
    let render = settings.render_config(detected_width)?;
    let generator = FrameGenerator::with_ramp(render, settings.glyph_ramp()?)?;
    log::info!(
        "rendu : {} colonnes, style {:?}, rampe de {} glyphes",
        render.width,
        render.style,
        generator.ramp().len()
    );
    Ok(generator)
}

/// Convertit toutes les images d'un dossier, en parallèle, en séquence.
///
/// # Errors
/// Returns an error if the folder is empty or unreadable, if any image
/// fails to convert, or if the step is invalid.
pub fn build_sequence(
    generator: &FrameGenerator,
    dir: &Path,
    playback: &PlaybackConfig,
) -> Result<FrameSequence> {
    let paths = ta_source::folder::scan_frames(dir)?;
    let frames = paths
        .par_iter()
        .map(|path| {
            generator
                .generate_path(path)
                .with_context(|| format!("Conversion impossible : {}", path.display()))
        })
        .collect::<Result<Vec<Frame>>>()?;

    log::info!("{} frames générées depuis {}", frames.len(), dir.display());
    Ok(FrameSequence::new(frames, playback.step)?
        .with_loop(playback.looping)
        .with_audio(playback.audio.clone()))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::Parser;
    use image::{Rgb, RgbImage};
    use ta_core::config::AudioExit;

    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["termascii", "--config", "/no/such/termascii.toml"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let settings = resolve_settings(&cli(&[])).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn cli_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.toml");
        std::fs::write(
            &path,
            "[render]\nwidth = 40\ncolor = \"greyscale\"\n[playback]\nfps = 5\n",
        )
        .unwrap();

        let path_str = path.to_str().unwrap();
        let args = Cli::try_parse_from([
            "termascii",
            "--config",
            path_str,
            "--width",
            "60",
            "--color-block",
            "--step-secs",
            "0.25",
            "--audio-on-stop",
            "terminate",
        ])
        .unwrap();
        let settings = resolve_settings(&args).unwrap();

        assert_eq!(settings.width, Some(60));
        assert_eq!(
            settings.style,
            RenderStyle::Color {
                mode: ColorMode::Greyscale,
                block: true
            }
        );
        assert_eq!(settings.playback.step, Duration::from_millis(250));
        assert_eq!(settings.playback.audio_exit, AudioExit::Terminate);
    }

    #[test]
    fn text_style_with_block_is_rejected() {
        assert!(resolve_settings(&cli(&["--style", "text", "--color-block"])).is_err());
        assert!(resolve_settings(&cli(&["--color", "sepia"])).is_err());
        assert!(resolve_settings(&cli(&["--fps", "0"])).is_err());
    }

    #[test]
    fn out_of_range_step_is_an_error_not_a_panic() {
        assert!(resolve_settings(&cli(&["--step-secs", "1e300"])).is_err());
        assert!(resolve_settings(&cli(&["--step-secs", "1e19"])).is_err());
        assert!(resolve_settings(&cli(&["--step-secs", "NaN"])).is_err());
        assert!(resolve_settings(&cli(&["--step-secs", "3600"])).is_ok());
    }

    #[test]
    fn folder_becomes_an_ordered_sequence() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]))
            .save(dir.path().join("001.png"))
            .unwrap();
        RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]))
            .save(dir.path().join("002.png"))
            .unwrap();

        let settings = resolve_settings(&cli(&["--style", "text", "--width", "5", "--loop"])).unwrap();
        let generator = build_generator(&settings, None).unwrap();
        let seq = build_sequence(&generator, dir.path(), &settings.playback).unwrap();

        assert_eq!(seq.len(), 2);
        assert!(seq.is_looping());
        assert_eq!(seq.frame(0).as_str(), ".....\n.....\n");
        assert_eq!(seq.frame(1).as_str(), "$$$$$\n$$$$$\n");
        assert_eq!(seq.total_duration(), Duration::from_millis(200));
    }

    #[test]
    fn undecodable_frame_fails_the_whole_sequence() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("001.png"), b"not a png").unwrap();
        let generator = build_generator(&Settings::default(), Some(10)).unwrap();
        assert!(build_sequence(&generator, dir.path(), &PlaybackConfig::default()).is_err());
    }
}
