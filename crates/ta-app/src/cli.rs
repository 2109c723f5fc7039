use std::path::PathBuf;

use clap::Parser;

/// termascii: images et séquences d'images en ASCII dans le terminal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Source visuelle : une image (PNG, JPEG, BMP, GIF), affichée une fois.
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Source visuelle : dossier d'images jouées dans l'ordre des noms.
    #[arg(long)]
    pub frames: Option<PathBuf>,

    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Colonnes de sortie (défaut : largeur du terminal).
    #[arg(short, long)]
    pub width: Option<u16>,

    /// Style : color, text.
    #[arg(long)]
    pub style: Option<String>,

    /// Couleur : full, greyscale.
    #[arg(long)]
    pub color: Option<String>,

    /// Espaces sur fond coloré au lieu de glyphes colorés.
    #[arg(long, default_value_t = false)]
    pub color_block: bool,

    /// Images par seconde.
    #[arg(long)]
    pub fps: Option<u32>,

    /// Durée d'une frame en secondes (prioritaire sur --fps).
    #[arg(long)]
    pub step_secs: Option<f64>,

    /// Rejouer la séquence en boucle.
    #[arg(long = "loop", default_value_t = false)]
    pub looping: bool,

    /// Piste audio jouée pendant la séquence.
    #[arg(long)]
    pub audio: Option<PathBuf>,

    /// Programme lecteur audio.
    #[arg(long)]
    pub audio_player: Option<String>,

    /// Sort du lecteur audio à l'arrêt : detach, terminate.
    #[arg(long)]
    pub audio_on_stop: Option<String>,

    /// Diagnostics de synchronisation (force le niveau de log debug).
    #[arg(long, default_value_t = false)]
    pub debug: bool,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// Source visuelle validée.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// Image unique, imprimée telle quelle.
    Image(PathBuf),
    /// Dossier de frames, joué par le planificateur.
    Frames(PathBuf),
}

impl Cli {
    /// Validate that exactly one visual source is provided.
    ///
    /// # Errors
    /// Returns an error if zero or more than one source is specified.
    pub fn source(&self) -> anyhow::Result<Source> {
        match (&self.image, &self.frames) {
            (Some(image), None) => Ok(Source::Image(image.clone())),
            (None, Some(dir)) => Ok(Source::Frames(dir.clone())),
            (None, None) => {
                anyhow::bail!("Aucune source visuelle spécifiée. Utilisez --image ou --frames.")
            }
            (Some(_), Some(_)) => {
                anyhow::bail!("Une seule source visuelle à la fois : --image OU --frames.")
            }
        }
    }
}
