use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;

use crate::audio::domain::audio_format::AudioFormat;
use crate::audio::domain::audio_reader::AudioReader;
use crate::audio::domain::audio_writer::AudioWriter;
use crate::pipeline::pipeline_logger::{elapsed_ms, PipelineLogger};
use crate::shared::output_paths::wav_path_for;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("no audio stream in {0}")]
    NoAudioStream(PathBuf),
}

/// Converts an MP3/MP4 file to a WAV file beside it.
pub struct ConvertAudioUseCase {
    reader: Box<dyn AudioReader>,
    writer: Box<dyn AudioWriter>,
}

impl ConvertAudioUseCase {
    pub fn new(reader: Box<dyn AudioReader>, writer: Box<dyn AudioWriter>) -> Self {
        Self { reader, writer }
    }

    /// Returns the path of the written WAV file. The format check happens
    /// before any decoding, so an unsupported input never produces a file.
    pub fn execute(
        &self,
        input: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let format = AudioFormat::from_path(input)?;
        let output = wav_path_for(input);
        logger.info(&format!(
            "Converting {} ({format}) to {}",
            input.display(),
            output.display()
        ));

        let start = Instant::now();
        let audio = self
            .reader
            .read_audio(input)?
            .ok_or_else(|| ConvertError::NoAudioStream(input.to_path_buf()))?;
        logger.timing("decode", elapsed_ms(start));

        let start = Instant::now();
        self.writer.write_audio(&output, &audio)?;
        logger.timing("encode", elapsed_ms(start));

        logger.info(&format!(
            "Wrote {:.1}s of audio ({} Hz, {} channel(s)) to {}",
            audio.duration(),
            audio.sample_rate(),
            audio.channels(),
            output.display()
        ));
        Ok(output)
    }
}
