use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use ta_player::{PlaybackScheduler, SchedulerOptions, StopToken, install_interrupt_handler};
use ta_render::AnsiScreen;

pub mod cli;
pub mod pipeline;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging avant la config, qui peut déjà avertir
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Trace)
        .init();
    log::set_max_level(effective_level(&cli.log_level, cli.debug));

    // 3. Charger la config et appliquer les overrides CLI
    let settings = pipeline::resolve_settings(&cli)?;
    if settings.playback.debug {
        log::set_max_level(effective_level(&cli.log_level, true));
    }

    // 4. Valider la source
    let source = cli.source()?;

    // 5. Générateur calé sur la largeur du terminal
    let (_, cols) = ta_render::query_size();
    let generator = pipeline::build_generator(&settings, Some(cols))?;

    match source {
        cli::Source::Image(path) => {
            let frame = generator
                .generate_path(&path)
                .with_context(|| format!("Conversion impossible : {}", path.display()))?;
            let mut out = io::stdout().lock();
            write!(out, "{frame}")?;
            out.flush()?;
        }
        cli::Source::Frames(dir) => {
            let sequence = pipeline::build_sequence(&generator, &dir, &settings.playback)?;

            // 6. Ctrl+C → jeton d'arrêt, observé à chaque itération
            let token = StopToken::new();
            if let Err(e) = install_interrupt_handler(&token) {
                log::warn!("Gestionnaire Ctrl+C indisponible : {e}");
            }

            // 7. Lecture (le terminal est restauré avant le retour)
            let mut player = PlaybackScheduler::with_token(
                sequence,
                AnsiScreen::stdout(),
                SchedulerOptions::from(&settings.playback),
                token,
            );
            let report = player.play()?;
            log::info!(
                "{:?} : {} frames affichées en {:.2}s",
                report.reason,
                report.frames_shown,
                report.elapsed.as_secs_f64()
            );
        }
    }
    Ok(())
}

/// Niveau de log effectif : `--log-level`, relevé à debug en mode debug.
fn effective_level(requested: &str, debug: bool) -> log::LevelFilter {
    let level = requested.parse().unwrap_or(log::LevelFilter::Warn);
    if debug {
        level.max(log::LevelFilter::Debug)
    } else {
        level
    }
}
