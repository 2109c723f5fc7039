use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ta_core::error::CoreError;

/// Extensions image reconnues.
const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// `true` si l'extension du chemin est une image reconnue.
#[must_use]
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| IMAGE_EXTS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Liste les images d'un dossier de frames, triées par nom.
///
/// Only the top level is scanned: a frame folder is flat, one file per tick.
///
/// # Errors
/// Returns an error if the folder cannot be read, or a
/// [`CoreError::Resource`] if it holds no image.
///
/// # Example
/// ```no_run
/// use ta_source::folder::scan_frames;
/// use std::path::Path;
/// let frames = scan_frames(Path::new("frames/")).unwrap();
/// ```
pub fn scan_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("Impossible de lire {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && is_image_path(&path) {
            files.push(path);
        }
    }
    if files.is_empty() {
        return Err(CoreError::Resource(format!("aucune image dans {}", dir.display())).into());
    }
    files.sort();
    log::info!("scan_frames: {} frames dans {}", files.len(), dir.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_are_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["010.png", "002.PNG", "001.jpg", "notes.txt"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.png")).unwrap();

        let frames = scan_frames(dir.path()).unwrap();
        let names: Vec<_> = frames
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, ["001.jpg", "002.PNG", "010.png"]);
    }

    #[test]
    fn empty_folder_is_a_resource_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan_frames(dir.path()).unwrap_err();
        assert!(err.downcast_ref::<CoreError>().is_some_and(CoreError::is_resource));
    }

    #[test]
    fn missing_folder_fails() {
        assert!(scan_frames(Path::new("/no/such/frames")).is_err());
    }
}
