/// Decoded audio: interleaved PCM samples normalized to [-1.0, 1.0] at the
/// source's own sample rate and channel count.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioSegment {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl AudioSegment {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_keeps_source_layout() {
        let seg = AudioSegment::new(vec![0.0; 8], 44100, 2);
        assert_eq!(seg.samples().len(), 8);
        assert_eq!(seg.sample_rate(), 44100);
        assert_eq!(seg.channels(), 2);
    }

    #[test]
    fn test_frames_stereo() {
        let seg = AudioSegment::new(vec![0.0; 96000], 48000, 2);
        assert_eq!(seg.frames(), 48000);
    }

    #[test]
    fn test_duration_mono() {
        let seg = AudioSegment::new(vec![0.0; 48000], 16000, 1);
        assert_relative_eq!(seg.duration(), 3.0);
    }

    #[test]
    fn test_duration_stereo() {
        let seg = AudioSegment::new(vec![0.0; 44100], 44100, 2);
        assert_relative_eq!(seg.duration(), 0.5);
    }

    #[test]
    fn test_zero_channels_has_no_frames() {
        let seg = AudioSegment::new(vec![0.0; 10], 16000, 0);
        assert_eq!(seg.frames(), 0);
        assert_eq!(seg.duration(), 0.0);
    }

    #[test]
    fn test_is_empty() {
        assert!(AudioSegment::new(Vec::new(), 16000, 1).is_empty());
        assert!(!AudioSegment::new(vec![0.1], 16000, 1).is_empty());
    }
}
