use std::path::{Path, PathBuf};

use super::constants::{TRANSLATION_FILE_SUFFIX, WAV_EXTENSION};

/// `<dir>/<stem>.wav` for a converter input.
pub fn wav_path_for(input: &Path) -> PathBuf {
    input.with_extension(WAV_EXTENSION)
}

/// `<dir>/<stem>_translation.txt` for a translator input.
pub fn translation_path_for(audio: &Path) -> PathBuf {
    let stem = audio
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    audio.with_file_name(format!("{stem}{TRANSLATION_FILE_SUFFIX}"))
}
