use std::path::PathBuf;
use std::thread;

use crossbeam_channel::Receiver;

use speechbridge_core::pipeline::pipeline_logger::NullPipelineLogger;
use speechbridge_core::pipeline::translate_audio_use_case::{
    TranslateAudioUseCase, TranslationOutput,
};
use speechbridge_core::translation::domain::target_language::TargetLanguage;
use speechbridge_core::translation::infrastructure::azure_translation_recognizer::AzureTranslationRecognizer;
use speechbridge_core::translation::infrastructure::speech_config::SpeechConfig;
use speechbridge_core::translation::infrastructure::text_file_translation_writer::TextFileTranslationWriter;

use super::WorkerMessage;

/// Parameters for a translation job.
pub struct TranslateParams {
    pub audio_path: PathBuf,
    pub target: TargetLanguage,
    pub config: SpeechConfig,
}

/// Spawn a background translation. The receiver yields exactly one message
/// once the recognition session has ended and the output is written.
pub fn spawn(params: TranslateParams) -> Receiver<WorkerMessage<TranslationOutput>> {
    let (tx, rx) = crossbeam_channel::bounded(1);

    thread::spawn(move || {
        let message = match run_translate(params) {
            Ok(output) => WorkerMessage::Complete(output),
            Err(e) => {
                log::error!("Translation failed: {e}");
                WorkerMessage::Error(e.to_string())
            }
        };
        let _ = tx.send(message);
    });

    rx
}

fn run_translate(params: TranslateParams) -> Result<TranslationOutput, Box<dyn std::error::Error>> {
    let mut use_case = TranslateAudioUseCase::new(
        Box::new(AzureTranslationRecognizer::new(params.config)),
        Box::new(TextFileTranslationWriter),
    );
    use_case.execute(&params.audio_path, params.target, &mut NullPipelineLogger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_missing_audio_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let audio_path = dir.path().join("absent.wav");

        let rx = spawn(TranslateParams {
            audio_path,
            target: TargetLanguage::Es,
            config: SpeechConfig::new("key", "westus"),
        });

        match rx.recv_timeout(Duration::from_secs(10)).unwrap() {
            WorkerMessage::Error(_) => {}
            other => panic!("expected error, got {other:?}"),
        }
        assert!(!dir.path().join("absent_translation.txt").exists());
    }
}
