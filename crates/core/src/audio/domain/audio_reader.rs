use std::path::Path;

use super::audio_segment::AudioSegment;

/// Domain interface for decoding the audio track of a media file.
pub trait AudioReader: Send {
    /// Decode the best audio stream at its native sample rate and channel
    /// count. Returns None if the file has no audio stream.
    fn read_audio(&self, path: &Path) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>>;
}
