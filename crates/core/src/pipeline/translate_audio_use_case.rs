use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::pipeline::pipeline_logger::{elapsed_ms, PipelineLogger};
use crate::shared::constants::SOURCE_LANGUAGE;
use crate::shared::output_paths::translation_path_for;
use crate::translation::domain::target_language::TargetLanguage;
use crate::translation::domain::translation_recognizer::{
    RecognitionRequest, TranslationRecognizer,
};
use crate::translation::domain::translation_session::{SessionEnd, TranslationSession};
use crate::translation::domain::translation_writer::TranslationWriter;

/// What a translation run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationOutput {
    pub path: PathBuf,
    pub segment_count: usize,
    pub end: SessionEnd,
}

/// Translates Mandarin speech in a WAV file and writes the translations
/// to `<base>_translation.txt` beside it.
///
/// Blocks until the recognizer reports the session stopped or canceled.
/// A canceled session still writes its (possibly empty) output.
pub struct TranslateAudioUseCase {
    recognizer: Box<dyn TranslationRecognizer>,
    writer: Box<dyn TranslationWriter>,
}

impl TranslateAudioUseCase {
    pub fn new(
        recognizer: Box<dyn TranslationRecognizer>,
        writer: Box<dyn TranslationWriter>,
    ) -> Self {
        Self { recognizer, writer }
    }

    pub fn execute(
        &mut self,
        audio_path: &Path,
        target: TargetLanguage,
        logger: &mut dyn PipelineLogger,
    ) -> Result<TranslationOutput, Box<dyn std::error::Error>> {
        let request = RecognitionRequest {
            audio_path: audio_path.to_path_buf(),
            source_language: SOURCE_LANGUAGE.to_string(),
            target_language: target,
        };
        logger.info(&format!(
            "Translating {} from {SOURCE_LANGUAGE} into {target}",
            audio_path.display()
        ));

        let (tx, rx) = crossbeam_channel::unbounded();
        let start = Instant::now();
        self.recognizer.start_continuous_recognition(&request, tx)?;

        let mut session = TranslationSession::new(target);
        for event in rx.iter() {
            if session.handle(event) {
                break;
            }
        }
        self.recognizer.stop_continuous_recognition()?;
        logger.timing("recognize", elapsed_ms(start));

        let result = session.finish();
        logger.count("translated", result.segments.len());
        logger.count("no_match", result.no_match_count);

        let path = translation_path_for(audio_path);
        let start = Instant::now();
        self.writer.write_translations(&path, &result.segments)?;
        logger.timing("write", elapsed_ms(start));
        logger.info(&format!("Translations saved to {}", path.display()));

        Ok(TranslationOutput {
            path,
            segment_count: result.segments.len(),
            end: result.end,
        })
    }
}
