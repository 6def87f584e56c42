use std::fmt;
use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioFormatError {
    #[error("Unsupported file format: {extension}")]
    Unsupported { extension: String },
}

/// Container formats the converter accepts, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Mp4,
}

impl AudioFormat {
    pub const ALL: &[AudioFormat] = &[AudioFormat::Mp3, AudioFormat::Mp4];

    /// Detect the format from the path's extension (case-insensitive).
    ///
    /// The error carries the extension with its leading dot, or an empty
    /// string when the path has none.
    pub fn from_path(path: &Path) -> Result<Self, AudioFormatError> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if extension.is_empty() {
            return Err(AudioFormatError::Unsupported {
                extension: String::new(),
            });
        }

        AudioFormat::ALL
            .iter()
            .copied()
            .find(|format| format.extension() == extension)
            .ok_or_else(|| AudioFormatError::Unsupported {
                extension: format!(".{extension}"),
            })
    }

    pub fn extension(self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Mp4 => "mp4",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioFormat::Mp3 => write!(f, "MP3"),
            AudioFormat::Mp4 => write!(f, "MP4"),
        }
    }
}
