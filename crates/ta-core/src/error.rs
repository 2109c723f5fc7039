use thiserror::Error;

/// Errors originating from the core module.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid configuration value or unsupported input format
    /// (e.g. channel depth above 16 bits, unknown style string).
    #[error("Configuration invalide : {0}")]
    Configuration(String),

    /// Input present but unusable: undecodable image bytes, empty frame source.
    #[error("Ressource inutilisable : {0}")]
    Resource(String),

    /// Referenced file does not exist.
    #[error("Fichier introuvable : {path}")]
    FileNotFound {
        /// Path that was not found.
        path: String,
    },

    /// Invalid width/height dimensions.
    #[error("Dimensions invalides : {width}×{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },
}

impl CoreError {
    /// `true` for the configuration family of errors (fail-fast, before output).
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::InvalidDimensions { .. })
    }

    /// `true` for the resource family of errors (bad or missing input).
    #[must_use]
    pub fn is_resource(&self) -> bool {
        matches!(self, Self::Resource(_) | Self::FileNotFound { .. })
    }
}
