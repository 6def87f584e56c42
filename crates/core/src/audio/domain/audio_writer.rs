use std::path::Path;

use super::audio_segment::AudioSegment;

/// Domain interface for encoding decoded audio to a file.
pub trait AudioWriter: Send {
    /// Encode the AudioSegment to `path`, replacing any existing file.
    fn write_audio(&self, path: &Path, audio: &AudioSegment)
        -> Result<(), Box<dyn std::error::Error>>;
}
