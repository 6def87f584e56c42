use std::path::Path;

use crate::audio::domain::audio_segment::AudioSegment;
use crate::audio::domain::audio_writer::AudioWriter;

/// Writes 16-bit signed PCM WAV files with hound.
pub struct WavAudioWriter;

impl AudioWriter for WavAudioWriter {
    fn write_audio(
        &self,
        path: &Path,
        audio: &AudioSegment,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if audio.channels() == 0 || audio.sample_rate() == 0 {
            return Err(format!(
                "Cannot write WAV with {} channel(s) at {} Hz",
                audio.channels(),
                audio.sample_rate()
            )
            .into());
        }

        let spec = hound::WavSpec {
            channels: audio.channels(),
            sample_rate: audio.sample_rate(),
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in audio.samples() {
            writer.write_sample(to_pcm16(sample))?;
        }
        writer.finalize()?;
        Ok(())
    }
}

fn to_pcm16(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    (clamped * i16::MAX as f32).round() as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_pcm16_clamps() {
        assert_eq!(to_pcm16(0.0), 0);
        assert_eq!(to_pcm16(1.0), i16::MAX);
        assert_eq!(to_pcm16(2.5), i16::MAX);
        assert_eq!(to_pcm16(-3.0), -i16::MAX);
    }

    #[test]
    fn test_write_audio_keeps_rate_and_channels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let audio = AudioSegment::new(vec![0.0, 0.5, -0.5, 0.25], 44100, 2);

        WavAudioWriter.write_audio(&path, &audio).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(spec.bits_per_sample, 16);
        let samples: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[1], to_pcm16(0.5));
    }

    #[test]
    fn test_write_audio_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        std::fs::write(&path, b"stale contents that are not a wav file").unwrap();

        let audio = AudioSegment::new(vec![0.1; 16], 16000, 1);
        WavAudioWriter.write_audio(&path, &audio).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.len(), 16);
    }

    #[test]
    fn test_write_audio_rejects_zero_channels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let audio = AudioSegment::new(vec![], 16000, 0);
        assert!(WavAudioWriter.write_audio(&path, &audio).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_write_audio_nonexistent_directory() {
        let audio = AudioSegment::new(vec![0.0; 16], 16000, 1);
        let path = Path::new("/nonexistent/dir/out.wav");
        assert!(WavAudioWriter.write_audio(path, &audio).is_err());
    }
}
