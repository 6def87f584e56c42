use std::path::PathBuf;

use crossbeam_channel::Sender;

use super::recognition_event::RecognitionEvent;
use super::target_language::TargetLanguage;

/// What to recognize and into which language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionRequest {
    pub audio_path: PathBuf,
    pub source_language: String,
    pub target_language: TargetLanguage,
}

/// Domain interface for continuous speech translation of an audio file.
///
/// Implementations deliver events on `events` from their own thread. The last
/// event of a session is `SessionStopped` or `Canceled`; dropping the sender
/// without either also ends the session.
pub trait TranslationRecognizer: Send {
    /// Fails only when the session cannot be set up (unreadable audio,
    /// invalid configuration). Service-side failures arrive as `Canceled`.
    fn start_continuous_recognition(
        &mut self,
        request: &RecognitionRequest,
        events: Sender<RecognitionEvent>,
    ) -> Result<(), Box<dyn std::error::Error>>;

    /// Stop the running session and release its resources. Safe to call
    /// after the session already ended.
    fn stop_continuous_recognition(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}
